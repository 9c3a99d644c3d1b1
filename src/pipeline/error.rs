use crate::config::ConfigError;
use crate::features::FeatureTableError;
use crate::library::LibraryError;
use crate::output::OutputError;
use crate::spectrum::SpectrumError;

/// Errors that can occur while running a batch or a single pairing
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid configuration; raised before any pairing is dispatched
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed spectral file
    #[error("Spectrum error: {0}")]
    Spectrum(#[from] SpectrumError),

    /// Malformed feature table
    #[error("Feature table error: {0}")]
    FeatureTable(#[from] FeatureTableError),

    /// Malformed library or criteria table
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    /// Failure writing results
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// I/O error while discovering inputs
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
