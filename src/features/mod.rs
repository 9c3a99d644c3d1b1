//! # Feature Table Normalizer
//!
//! Experimental feature tables come out of peak-picking software with an
//! arbitrary number of header rows and the interesting values in arbitrary
//! columns. [`normalize`] reduces such a table to typed [`Feature`] records.

use std::io::Read;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::FeatureColumns;
use crate::table;

pub use error::FeatureTableError;

mod error;

/// One experimental precursor feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Observed m/z
    pub mz: f64,
    /// Retention time in minutes
    pub retention_time: f64,
    /// Feature comment / identifier, used as a join key downstream
    pub comment: String,
}

impl Feature {
    /// Create a new feature
    pub fn new(mz: f64, retention_time: f64, comment: impl Into<String>) -> Self {
        Self {
            mz,
            retention_time,
            comment: comment.into(),
        }
    }
}

/// Normalize the feature table at `path`
pub fn normalize_file<P: AsRef<Path>>(
    path: P,
    columns: &FeatureColumns,
) -> Result<Vec<Feature>, FeatureTableError> {
    let path = path.as_ref();
    let (source, delimiter) = table::open(path)?;
    let features = normalize(source, delimiter, columns)?;
    debug!("Read {} features from {}", features.len(), path.display());
    Ok(features)
}

/// Extract `(m/z, RT, comment)` triples from a delimited table
///
/// Rows above `first_data_row` are ignored, as are rows whose m/z or RT cell
/// is not numeric. Fails if a configured column lies beyond the widest row.
pub fn normalize<R: Read>(
    source: R,
    delimiter: u8,
    columns: &FeatureColumns,
) -> Result<Vec<Feature>, FeatureTableError> {
    let records = table::raw_reader(source, delimiter)
        .into_records()
        .collect::<Result<Vec<_>, _>>()?;

    let available = records.iter().map(|r| r.len()).max().unwrap_or(0);
    for (name, column) in [
        ("m/z", columns.mz_column),
        ("retention time", columns.rt_column),
        ("comment", columns.comment_column),
    ] {
        if column == 0 || column > available {
            return Err(FeatureTableError::ColumnOutOfRange {
                name,
                column,
                available,
            });
        }
    }

    let mut features = Vec::with_capacity(records.len());
    let first_row = columns.first_data_row.saturating_sub(1);
    for (row, record) in records.iter().enumerate().skip(first_row) {
        let Some(mz) = table::parse_number(record.get(columns.mz_column - 1)) else {
            debug!("Skipping feature row {}: m/z is not numeric", row + 1);
            continue;
        };
        let Some(retention_time) = table::parse_number(record.get(columns.rt_column - 1)) else {
            debug!("Skipping feature row {}: RT is not numeric", row + 1);
            continue;
        };
        let comment = record.get(columns.comment_column - 1).unwrap_or_default();
        features.push(Feature::new(mz, retention_time, comment));
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TABLE: &str = "\
Sample export,,,
m/z,RT,ID,Area
760.5853,5.00,101,1e6
,,,
782.5670,5.21,102,2e5
not a number,5.3,103,1
";

    fn columns() -> FeatureColumns {
        FeatureColumns {
            mz_column: 1,
            rt_column: 2,
            comment_column: 3,
            first_data_row: 3,
        }
    }

    #[test]
    fn test_normalize_skips_headers_and_blank_rows() {
        let features = normalize(Cursor::new(TABLE), b',', &columns()).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0], Feature::new(760.5853, 5.00, "101"));
        assert_eq!(features[1].comment, "102");
    }

    #[test]
    fn test_header_rows_are_tolerated_without_first_row() {
        let cols = FeatureColumns {
            first_data_row: 1,
            ..columns()
        };
        let features = normalize(Cursor::new(TABLE), b',', &cols).unwrap();
        assert_eq!(features.len(), 2);
    }

    #[test]
    fn test_reordered_columns() {
        let table = "id\trt\tmz\nA\t1.5\t500.25\n";
        let cols = FeatureColumns {
            mz_column: 3,
            rt_column: 2,
            comment_column: 1,
            first_data_row: 2,
        };
        let features = normalize(Cursor::new(table), b'\t', &cols).unwrap();
        assert_eq!(features, vec![Feature::new(500.25, 1.5, "A")]);
    }

    #[test]
    fn test_column_out_of_range() {
        let cols = FeatureColumns {
            comment_column: 9,
            ..columns()
        };
        let err = normalize(Cursor::new(TABLE), b',', &cols).unwrap_err();
        assert!(matches!(
            err,
            FeatureTableError::ColumnOutOfRange {
                column: 9,
                available: 4,
                ..
            }
        ));
    }
}
