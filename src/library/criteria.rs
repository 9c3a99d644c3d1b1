use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::LibraryError;
use crate::config::{AcquisitionMode, Polarity};
use crate::table;

/// One row of the library criteria table
///
/// ```text
/// library,mode,polarity,and_columns,or_columns
/// PC_H.csv,ddMS,Pos,4,
/// PE_H.csv,AIF,Pos,4;5,6 7
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaEntry {
    /// Library file name, relative to the library directory
    pub library: String,
    /// Acquisition mode the library applies to
    pub mode: AcquisitionMode,
    /// Polarity the library applies to
    pub polarity: Polarity,
    /// 1-based library columns that must all be confirmed
    pub and_columns: Vec<usize>,
    /// 1-based library columns of which at least one must be confirmed
    pub or_columns: Vec<usize>,
}

impl CriteriaEntry {
    /// True if this entry applies to spectra acquired with `mode`/`polarity`
    pub fn applies_to(&self, mode: AcquisitionMode, polarity: Polarity) -> bool {
        self.mode == mode && self.polarity == polarity
    }
}

#[derive(Debug, Deserialize)]
struct RawCriteria {
    #[serde(alias = "Library", alias = "library_file")]
    library: String,
    #[serde(alias = "Mode", alias = "ms_type")]
    mode: String,
    #[serde(alias = "Polarity")]
    polarity: String,
    #[serde(default, alias = "AND", alias = "and")]
    and_columns: String,
    #[serde(default, alias = "OR", alias = "or")]
    or_columns: String,
}

/// Load the criteria table at `path`
pub fn load_criteria<P: AsRef<Path>>(path: P) -> Result<Vec<CriteriaEntry>, LibraryError> {
    let (source, delimiter) = table::open(path.as_ref())?;
    read_criteria(source, delimiter)
}

/// Parse a criteria table from a delimited source with a header row
pub fn read_criteria<R: Read>(source: R, delimiter: u8) -> Result<Vec<CriteriaEntry>, LibraryError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut entries = Vec::new();
    for raw in reader.deserialize::<RawCriteria>() {
        let raw = raw?;
        if raw.library.is_empty() {
            continue;
        }
        let invalid = |reason: String| LibraryError::InvalidCriteria {
            library: raw.library.clone(),
            reason,
        };
        let mode = raw.mode.parse::<AcquisitionMode>().map_err(invalid)?;
        let polarity = raw.polarity.parse::<Polarity>().map_err(invalid)?;
        let and_columns = parse_columns(&raw.and_columns).map_err(invalid)?;
        let or_columns = parse_columns(&raw.or_columns).map_err(invalid)?;
        entries.push(CriteriaEntry {
            library: raw.library,
            mode,
            polarity,
            and_columns,
            or_columns,
        });
    }
    Ok(entries)
}

/// Parse `"4;5 6"` into `[4, 5, 6]`
fn parse_columns(cell: &str) -> Result<Vec<usize>, String> {
    cell.split(|c: char| c == ';' || c == '|' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| match t.parse::<usize>() {
            Ok(0) | Err(_) => Err(format!("`{t}` is not a 1-based column number")),
            Ok(column) => Ok(column),
        })
        .collect()
}
