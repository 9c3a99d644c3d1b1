/// Errors that can occur while loading libraries and criteria tables
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// I/O error reading a library or criteria file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// A configured column is missing from the library header
    #[error("Library has no column {column} ({name}); header has {available} columns")]
    MissingColumn {
        /// Which configured column is missing
        name: &'static str,
        /// The configured 1-based index
        column: usize,
        /// Header width
        available: usize,
    },

    /// A criteria row could not be interpreted
    #[error("Invalid criteria entry for {library}: {reason}")]
    InvalidCriteria {
        /// Library file named by the row
        library: String,
        /// Human-readable reason
        reason: String,
    },
}
