/// Errors that can occur while reading a scan-oriented spectral file
#[derive(Debug, thiserror::Error)]
pub enum SpectrumError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The input contains no `S` scan-boundary line at all
    #[error("No scan markers found; input is not an MS1/MS2 text file")]
    NoScanMarkers,

    /// A scan-boundary line could not be parsed
    #[error("Invalid scan header at line {line}: {content}")]
    InvalidScanHeader {
        /// 1-based line number
        line: usize,
        /// Offending line content
        content: String,
    },

    /// A scan with peaks carries no `RTime` information line
    #[error("Scan {scan_number} has no retention time")]
    MissingRetentionTime {
        /// Scan number from the boundary line
        scan_number: u64,
    },
}
