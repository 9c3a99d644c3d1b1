/// Errors that can occur while normalizing a feature table
#[derive(Debug, thiserror::Error)]
pub enum FeatureTableError {
    /// I/O error reading the table
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// A configured column index lies beyond the table width
    #[error("Column {column} ({name}) exceeds the table's {available} columns")]
    ColumnOutOfRange {
        /// Which configured column is out of range
        name: &'static str,
        /// The configured 1-based index
        column: usize,
        /// Number of columns found in the table
        available: usize,
    },
}
