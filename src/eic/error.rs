use std::path::PathBuf;

use crate::spectrum::SpectrumError;

/// Errors that can occur while extracting ion chromatograms
#[derive(Debug, thiserror::Error)]
pub enum EicError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A spectral file could not be parsed
    #[error("{}: {source}", path.display())]
    Spectrum {
        /// File that failed
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: SpectrumError,
    },
}
