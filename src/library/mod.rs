//! Theoretical lipid libraries and the criteria table that selects them.
//!
//! A library is a delimited table with one row per lipid-adduct species:
//!
//! ```text
//! Class,ID,Precursor,PC head group,Loss of head group
//! PC,PC(34:1)+H,760.5851,184.0733,577.5190
//! ```
//!
//! The ID and precursor columns are configurable. Every column after the
//! precursor column holds a theoretical fragment m/z; anything else is kept
//! verbatim as metadata.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::confirmation::ConfirmationRule;
use crate::table;

pub use criteria::{load_criteria, read_criteria, CriteriaEntry};
pub use error::LibraryError;

mod criteria;
mod error;

/// 1-based positions of the ID and precursor columns in a library file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryLayout {
    /// Column holding the species identifier
    pub id_column: usize,
    /// Column holding the theoretical precursor m/z
    pub precursor_column: usize,
}

impl Default for LibraryLayout {
    fn default() -> Self {
        Self {
            id_column: 1,
            precursor_column: 2,
        }
    }
}

/// A fragment column of a library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentColumn {
    /// Header text
    pub name: String,
    /// 1-based position in the library file
    pub library_column: usize,
}

/// One candidate lipid-adduct species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Species identifier
    pub id: String,
    /// Theoretical precursor m/z
    pub precursor_mz: f64,
    /// Theoretical fragment m/z per fragment column; `None` for blank cells
    pub fragment_mz: Vec<Option<f64>>,
    /// Metadata cells, aligned with [`Library::metadata_columns`]
    pub metadata: Vec<String>,
}

/// A parsed library
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    /// Library name (file stem)
    pub name: String,
    /// Header of the ID column
    pub id_header: String,
    /// Header of the precursor column
    pub precursor_header: String,
    /// Fragment columns in file order
    pub fragment_columns: Vec<FragmentColumn>,
    /// Headers of the metadata columns
    pub metadata_columns: Vec<String>,
    /// Library rows
    pub entries: Vec<LibraryEntry>,
}

impl Library {
    /// Load a library file; its name is the file stem
    pub fn from_file<P: AsRef<Path>>(path: P, layout: &LibraryLayout) -> Result<Self, LibraryError> {
        let path = path.as_ref();
        let (source, delimiter) = table::open(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let library = Self::from_reader(source, delimiter, &name, layout)?;
        debug!(
            "Loaded library {} ({} entries, {} fragment columns)",
            library.name,
            library.entries.len(),
            library.fragment_columns.len()
        );
        Ok(library)
    }

    /// Parse a library from a delimited source whose first row is a header
    pub fn from_reader<R: Read>(
        source: R,
        delimiter: u8,
        name: &str,
        layout: &LibraryLayout,
    ) -> Result<Self, LibraryError> {
        let mut records = table::raw_reader(source, delimiter).into_records();
        let header = match records.next() {
            Some(header) => header?,
            None => csv::StringRecord::new(),
        };

        for (column_name, column) in [("id", layout.id_column), ("precursor", layout.precursor_column)] {
            if column == 0 || column > header.len() {
                return Err(LibraryError::MissingColumn {
                    name: column_name,
                    column,
                    available: header.len(),
                });
            }
        }

        let id_index = layout.id_column - 1;
        let precursor_index = layout.precursor_column - 1;
        let fragment_columns: Vec<FragmentColumn> = (precursor_index + 1..header.len())
            .filter(|&i| i != id_index)
            .map(|i| FragmentColumn {
                name: header.get(i).unwrap_or_default().to_string(),
                library_column: i + 1,
            })
            .collect();
        let metadata_indices: Vec<usize> = (0..precursor_index).filter(|&i| i != id_index).collect();

        let mut entries = Vec::new();
        for (row, record) in records.enumerate() {
            let record = record?;
            let Some(precursor_mz) = table::parse_number(record.get(precursor_index)) else {
                debug!("Skipping library row {}: precursor is not numeric", row + 2);
                continue;
            };
            entries.push(LibraryEntry {
                id: record.get(id_index).unwrap_or_default().to_string(),
                precursor_mz,
                fragment_mz: fragment_columns
                    .iter()
                    .map(|c| table::parse_number(record.get(c.library_column - 1)))
                    .collect(),
                metadata: metadata_indices
                    .iter()
                    .map(|&i| record.get(i).unwrap_or_default().to_string())
                    .collect(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            id_header: header.get(id_index).unwrap_or_default().to_string(),
            precursor_header: header.get(precursor_index).unwrap_or_default().to_string(),
            metadata_columns: metadata_indices
                .iter()
                .map(|&i| header.get(i).unwrap_or_default().to_string())
                .collect(),
            fragment_columns,
            entries,
        })
    }

    /// Fragment index of a 1-based library column, if it is a fragment column
    pub fn fragment_index(&self, library_column: usize) -> Option<usize> {
        self.fragment_columns
            .iter()
            .position(|c| c.library_column == library_column)
    }

    /// Translate a criteria entry's library columns into a [`ConfirmationRule`]
    pub fn rule_for(&self, criteria: &CriteriaEntry) -> Result<ConfirmationRule, LibraryError> {
        let translate = |columns: &[usize]| {
            columns
                .iter()
                .map(|&c| {
                    self.fragment_index(c).ok_or_else(|| LibraryError::InvalidCriteria {
                        library: criteria.library.clone(),
                        reason: format!("column {c} is not a fragment column of {}", self.name),
                    })
                })
                .collect::<Result<BTreeSet<usize>, LibraryError>>()
        };
        let rule = ConfirmationRule::new(
            translate(&criteria.and_columns)?,
            translate(&criteria.or_columns)?,
        );
        if rule.is_empty() {
            debug!(
                "Library {} has no AND/OR columns; every matched row will be retained",
                self.name
            );
        }
        Ok(rule)
    }

    /// `(column name, theoretical m/z)` pairs of an entry, skipping blank cells
    pub fn fragments<'a>(
        &'a self,
        entry: &'a LibraryEntry,
    ) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.fragment_columns
            .iter()
            .zip(&entry.fragment_mz)
            .filter_map(|(column, mz)| mz.map(|mz| (column.name.as_str(), mz)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AcquisitionMode, Polarity};
    use std::io::Cursor;

    const LIBRARY: &str = "\
Class,ID,Precursor,PC head group,Loss of head group
PC,PC(34:1)+H,760.5851,184.0733,577.5190
PC,PC(36:2)+H,786.6007,184.0733,
PC,broken,n/a,184.0733,1
";

    fn layout() -> LibraryLayout {
        LibraryLayout {
            id_column: 2,
            precursor_column: 3,
        }
    }

    #[test]
    fn test_parse_library() {
        let library = Library::from_reader(Cursor::new(LIBRARY), b',', "PC_H", &layout()).unwrap();
        assert_eq!(library.name, "PC_H");
        assert_eq!(library.entries.len(), 2);
        assert_eq!(library.metadata_columns, vec!["Class"]);
        assert_eq!(library.fragment_columns.len(), 2);
        assert_eq!(library.fragment_columns[0].name, "PC head group");
        assert_eq!(library.fragment_columns[0].library_column, 4);

        let entry = &library.entries[1];
        assert_eq!(entry.id, "PC(36:2)+H");
        assert_eq!(entry.fragment_mz, vec![Some(184.0733), None]);
        assert_eq!(entry.metadata, vec!["PC"]);

        let fragments: Vec<_> = library.fragments(entry).collect();
        assert_eq!(fragments, vec![("PC head group", 184.0733)]);
    }

    #[test]
    fn test_missing_precursor_column() {
        let layout = LibraryLayout {
            id_column: 1,
            precursor_column: 12,
        };
        let err = Library::from_reader(Cursor::new(LIBRARY), b',', "x", &layout).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::MissingColumn {
                column: 12,
                available: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_rule_translation() {
        let library = Library::from_reader(Cursor::new(LIBRARY), b',', "PC_H", &layout()).unwrap();
        let criteria = CriteriaEntry {
            library: "PC_H.csv".to_string(),
            mode: AcquisitionMode::DdMs,
            polarity: Polarity::Positive,
            and_columns: vec![4],
            or_columns: vec![5],
        };
        let rule = library.rule_for(&criteria).unwrap();
        assert!(rule.and_columns.contains(&0));
        assert!(rule.or_columns.contains(&1));

        let bad = CriteriaEntry {
            and_columns: vec![3],
            ..criteria
        };
        assert!(matches!(
            library.rule_for(&bad),
            Err(LibraryError::InvalidCriteria { .. })
        ));
    }
}
