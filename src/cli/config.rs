//! TOML run file for batch runs.
//!
//! ```toml
//! # lipidflow.toml
//! [tolerances]
//! retention_time_window = 0.3
//! ppm_window = 10
//! precursor_mass_accuracy = 0.01
//!
//! [features]
//! mz_column = 1
//! rt_column = 2
//! comment_column = 3
//! first_data_row = 2
//!
//! [library]
//! directory = "libraries"
//! criteria = "libraries/criteria.csv"
//!
//! [input]
//! spectra_dir = "spectra"
//! output_dir = "results"
//! positive_features = "PosFeatures.csv"
//! negative_features = "NegFeatures.csv"
//! ```
//!
//! Relative paths are resolved against the run file's directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use lipidflow::config::{ConfigError, FeatureColumns, MatchConfig};
use lipidflow::library::LibraryLayout;
use lipidflow::pipeline::BatchConfig;

/// Root configuration structure for lipidflow.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Matching tolerances and thresholds.
    #[serde(default)]
    pub tolerances: MatchConfig,

    /// Feature table layout.
    #[serde(default)]
    pub features: FeatureColumns,

    /// Library location and layout.
    #[serde(default)]
    pub library: LibrarySection,

    /// Input and output locations.
    #[serde(default)]
    pub input: InputSection,
}

/// `[library]` section.
#[derive(Debug, Default, Deserialize)]
pub struct LibrarySection {
    /// Directory holding the library files.
    pub directory: Option<PathBuf>,

    /// Criteria table; defaults to `criteria.csv` in the library directory.
    pub criteria: Option<PathBuf>,

    /// 1-based identifier column.
    pub id_column: Option<usize>,

    /// 1-based precursor m/z column.
    pub precursor_column: Option<usize>,
}

/// `[input]` section.
#[derive(Debug, Default, Deserialize)]
pub struct InputSection {
    /// Directory of `.ms2`/`.ms1` files.
    pub spectra_dir: Option<PathBuf>,

    /// Output directory.
    pub output_dir: Option<PathBuf>,

    /// Feature table for positive-mode samples.
    pub positive_features: Option<PathBuf>,

    /// Feature table for negative-mode samples.
    pub negative_features: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve into a batch configuration, with relative paths taken from `base`.
    pub fn into_batch_config(self, base: &Path) -> Result<BatchConfig, ConfigError> {
        let resolve = |path: PathBuf| if path.is_absolute() { path } else { base.join(path) };
        let required = |value: Option<PathBuf>, field: &'static str| {
            value.map(resolve).ok_or_else(|| ConfigError::Invalid {
                field,
                reason: "missing from the run file".to_string(),
            })
        };

        let library_dir = required(self.library.directory, "library.directory")?;
        let criteria = self
            .library
            .criteria
            .map(resolve)
            .unwrap_or_else(|| library_dir.join("criteria.csv"));
        let defaults = LibraryLayout::default();
        let library_layout = LibraryLayout {
            id_column: self.library.id_column.unwrap_or(defaults.id_column),
            precursor_column: self.library.precursor_column.unwrap_or(defaults.precursor_column),
        };

        let positive_features = self.input.positive_features.map(resolve);
        let negative_features = self.input.negative_features.map(resolve);
        if positive_features.is_none() && negative_features.is_none() {
            return Err(ConfigError::Invalid {
                field: "input.positive_features",
                reason: "at least one feature table is required".to_string(),
            });
        }

        let config = BatchConfig {
            match_config: self.tolerances,
            feature_columns: self.features,
            library_layout,
            spectra_dir: required(self.input.spectra_dir, "input.spectra_dir")?,
            output_dir: required(self.input.output_dir, "input.output_dir")?,
            library_dir,
            criteria,
            positive_features,
            negative_features,
        };
        config.match_config.validate()?;
        config.feature_columns.validate()?;
        Ok(config)
    }
}
