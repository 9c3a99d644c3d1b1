//! Matching tolerances and table layout settings.
//!
//! Every component entry point takes a `&MatchConfig` rather than reading
//! process-wide state, so one configuration value describes one run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use error::ConfigError;

mod error;

/// Acquisition strategy of a spectral file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcquisitionMode {
    /// Data-dependent MS/MS: each MS2 scan isolates one precursor
    #[serde(rename = "ddMS", alias = "ddms", alias = "DDMS")]
    DdMs,
    /// All-ion fragmentation: every precursor is fragmented in every scan
    #[serde(rename = "AIF", alias = "aif")]
    Aif,
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DdMs => write!(f, "ddMS"),
            Self::Aif => write!(f, "AIF"),
        }
    }
}

impl FromStr for AcquisitionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ddms" | "ddms2" | "dda" => Ok(Self::DdMs),
            "aif" => Ok(Self::Aif),
            other => Err(format!("unknown acquisition mode `{other}`")),
        }
    }
}

/// Ionization polarity of a spectral file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Positive ion mode
    #[serde(rename = "Pos", alias = "pos", alias = "positive")]
    Positive,
    /// Negative ion mode
    #[serde(rename = "Neg", alias = "neg", alias = "negative")]
    Negative,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "Pos"),
            Self::Negative => write!(f, "Neg"),
        }
    }
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pos" | "positive" | "+" => Ok(Self::Positive),
            "neg" | "negative" | "-" => Ok(Self::Negative),
            other => Err(format!("unknown polarity `{other}`")),
        }
    }
}

/// Tolerances and thresholds shared by the matcher, confirmation engine and
/// AIF correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Full retention-time window in minutes; candidates get ±half of it
    pub retention_time_window: f64,

    /// Full fragment mass window in ppm; peaks are accepted within ±half of it
    pub ppm_window: f64,

    /// Full precursor tolerance in Da for library/feature matching
    pub precursor_mass_accuracy: f64,

    /// Full precursor isolation tolerance in Da for ddMS scan selection
    pub selection_accuracy: f64,

    /// A fragment must exceed this intensity in at least one scan
    pub intensity_cutoff: f64,

    /// Minimum number of scans carrying the fragment (ddMS)
    pub scan_cutoff: usize,

    /// Minimum number of scans (AIF confirmation) and MS1/MS2 couples (correlation)
    pub min_aif_scans: usize,

    /// Minimum adjusted R² for an AIF correlation to count
    pub min_adjusted_r2: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            retention_time_window: 0.3,
            ppm_window: 10.0,
            precursor_mass_accuracy: 0.01,
            selection_accuracy: 1.0,
            intensity_cutoff: 1000.0,
            scan_cutoff: 1,
            min_aif_scans: 5,
            min_adjusted_r2: 0.6,
        }
    }
}

impl MatchConfig {
    /// Half-width of the retention-time window
    pub fn rt_half_window(&self) -> f64 {
        self.retention_time_window / 2.0
    }

    /// Half-width of the precursor matching tolerance in Da
    pub fn precursor_half_tolerance(&self) -> f64 {
        self.precursor_mass_accuracy / 2.0
    }

    /// Half-width of the ddMS precursor isolation tolerance in Da
    pub fn selection_half_tolerance(&self) -> f64 {
        self.selection_accuracy / 2.0
    }

    /// Absolute fragment tolerance in Da around `theoretical_mz`
    pub fn fragment_tolerance(&self, theoretical_mz: f64) -> f64 {
        theoretical_mz * (self.ppm_window / 2.0) / 1e6
    }

    /// Minimum scan count required to confirm a fragment in `mode`
    pub fn min_scans(&self, mode: AcquisitionMode) -> usize {
        match mode {
            AcquisitionMode::DdMs => self.scan_cutoff,
            AcquisitionMode::Aif => self.min_aif_scans,
        }
    }

    /// Reject values that would make every comparison meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("retention_time_window", self.retention_time_window)?;
        positive("ppm_window", self.ppm_window)?;
        positive("precursor_mass_accuracy", self.precursor_mass_accuracy)?;
        positive("selection_accuracy", self.selection_accuracy)?;

        if !self.intensity_cutoff.is_finite() || self.intensity_cutoff < 0.0 {
            return Err(ConfigError::Invalid {
                field: "intensity_cutoff",
                reason: format!("must be a finite value >= 0, got {}", self.intensity_cutoff),
            });
        }
        if self.scan_cutoff == 0 {
            return Err(ConfigError::Invalid {
                field: "scan_cutoff",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_aif_scans == 0 {
            return Err(ConfigError::Invalid {
                field: "min_aif_scans",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_adjusted_r2) {
            return Err(ConfigError::Invalid {
                field: "min_adjusted_r2",
                reason: format!("must lie in [0, 1], got {}", self.min_adjusted_r2),
            });
        }
        Ok(())
    }
}

/// Relative slack applied to every inclusive tolerance bound
pub const BOUNDARY_EPSILON: f64 = 1e-9;

/// Absolute slack for an inclusive bound around `target`
///
/// Decimal inputs such as `7.77 + 0.1` are not exact in `f64`; a value sitting
/// on the decimal boundary must still land inside it.
pub fn boundary_slack(target: f64) -> f64 {
    BOUNDARY_EPSILON * target.abs().max(1.0)
}

/// `|value - target| <= tolerance`, allowing for rounding at the boundary
pub fn within_tolerance(value: f64, target: f64, tolerance: f64) -> bool {
    (value - target).abs() <= tolerance + boundary_slack(target)
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a finite value > 0, got {value}"),
        })
    }
}

/// 1-based column layout of an experimental feature table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureColumns {
    /// Column holding the feature m/z
    pub mz_column: usize,
    /// Column holding the feature retention time (minutes)
    pub rt_column: usize,
    /// Column holding the feature comment / identifier
    pub comment_column: usize,
    /// First row carrying numeric data (rows above are headers)
    pub first_data_row: usize,
}

impl Default for FeatureColumns {
    fn default() -> Self {
        Self {
            mz_column: 1,
            rt_column: 2,
            comment_column: 3,
            first_data_row: 2,
        }
    }
}

impl FeatureColumns {
    /// All indices are 1-based, so zero is never valid
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("mz_column", self.mz_column),
            ("rt_column", self.rt_column),
            ("comment_column", self.comment_column),
            ("first_data_row", self.first_data_row),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "indices are 1-based and must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Largest column index referenced
    pub fn max_column(&self) -> usize {
        self.mz_column.max(self.rt_column).max(self.comment_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        MatchConfig::default().validate().unwrap();
        FeatureColumns::default().validate().unwrap();
    }

    #[test]
    fn test_fragment_tolerance() {
        let config = MatchConfig {
            ppm_window: 10.0,
            ..Default::default()
        };
        // ±5 ppm of 1000 Da
        assert!((config.fragment_tolerance(1000.0) - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_within_tolerance_decimal_edges() {
        // 184.0783 - 184.0733 evaluates to slightly more than 0.005
        assert!(within_tolerance(184.0783, 184.0733, 0.01 / 2.0));
        assert!(within_tolerance(184.0683, 184.0733, 0.01 / 2.0));
        assert!(within_tolerance(7.87, 7.77, 0.2 / 2.0));
        assert!(!within_tolerance(184.0784, 184.0733, 0.01 / 2.0));
        assert!(!within_tolerance(7.8701, 7.77, 0.2 / 2.0));
    }

    #[test]
    fn test_min_scans_by_mode() {
        let config = MatchConfig {
            scan_cutoff: 2,
            min_aif_scans: 4,
            ..Default::default()
        };
        assert_eq!(config.min_scans(AcquisitionMode::DdMs), 2);
        assert_eq!(config.min_scans(AcquisitionMode::Aif), 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = MatchConfig {
            ppm_window: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "ppm_window", .. })
        ));

        let config = MatchConfig {
            retention_time_window: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let columns = FeatureColumns {
            rt_column: 0,
            ..Default::default()
        };
        assert!(matches!(
            columns.validate(),
            Err(ConfigError::Invalid { field: "rt_column", .. })
        ));
    }

    #[test]
    fn test_mode_and_polarity_parsing() {
        assert_eq!("AIF".parse::<AcquisitionMode>().unwrap(), AcquisitionMode::Aif);
        assert_eq!("ddMS".parse::<AcquisitionMode>().unwrap(), AcquisitionMode::DdMs);
        assert_eq!("Neg".parse::<Polarity>().unwrap(), Polarity::Negative);
        assert!("sideways".parse::<Polarity>().is_err());
    }
}
