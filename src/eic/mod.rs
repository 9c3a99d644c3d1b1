//! # Extracted Ion Chromatograms
//!
//! For every feature of a feature table, every peak in a directory of
//! spectral files that lies within an absolute m/z tolerance of the feature
//! m/z becomes one chromatogram point. Points near the feature's retention
//! time are flagged so a plot can zoom onto the peak apex.
//!
//! ```text
//! Feature,RT,Intensity,mz,File,Zoom
//! 101,4.982,1520,760.5849,Plasma_01_Pos.ms1,TRUE
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::features::Feature;
use crate::spectrum::{Scan, SpectrumFile};

pub use error::EicError;

mod error;

/// Extraction tolerances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EicSettings {
    /// Absolute m/z half-width (Da); peaks must lie strictly inside it
    pub mz_tolerance: f64,
    /// Retention-time half-width (minutes) of the zoom flag
    pub zoom_window: f64,
}

impl Default for EicSettings {
    fn default() -> Self {
        Self {
            mz_tolerance: 0.005,
            zoom_window: 0.5,
        }
    }
}

impl EicSettings {
    /// Reject non-positive or non-finite tolerances
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("mz_tolerance", self.mz_tolerance), ("zoom_window", self.zoom_window)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// One chromatogram point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EicPoint {
    /// Feature identifier (the feature comment)
    pub feature: String,
    /// Scan retention time
    pub retention_time: f64,
    /// Peak intensity
    pub intensity: f64,
    /// Peak m/z
    pub mz: f64,
    /// Spectral file name
    pub file: String,
    /// Scan lies strictly within the zoom window of the feature RT
    pub zoom: bool,
}

/// Chromatogram points of every feature in one file's scans
///
/// Points are grouped by feature, in feature order, then by scan order.
pub fn extract_scans(
    features: &[Feature],
    scans: &[Scan],
    file: &str,
    settings: &EicSettings,
) -> Vec<EicPoint> {
    extract_indexed(features, scans, file, settings)
        .into_iter()
        .map(|(_, point)| point)
        .collect()
}

fn extract_indexed(
    features: &[Feature],
    scans: &[Scan],
    file: &str,
    settings: &EicSettings,
) -> Vec<(usize, EicPoint)> {
    let mut points = Vec::new();
    for (index, feature) in features.iter().enumerate() {
        for scan in scans {
            let zoom = (scan.retention_time - feature.retention_time).abs() < settings.zoom_window;
            for peak in scan
                .peaks
                .iter()
                .filter(|p| (p.mz - feature.mz).abs() < settings.mz_tolerance)
            {
                let point = EicPoint {
                    feature: feature.comment.clone(),
                    retention_time: scan.retention_time,
                    intensity: peak.intensity,
                    mz: peak.mz,
                    file: file.to_string(),
                    zoom,
                };
                points.push((index, point));
            }
        }
    }
    points
}

/// `.ms1` and `.ms2` files directly inside `dir`, sorted by name
pub fn spectral_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("ms1") || e.eq_ignore_ascii_case("ms2"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn extract_file(
    path: &Path,
    features: &[Feature],
    settings: &EicSettings,
) -> Result<Vec<(usize, EicPoint)>, EicError> {
    let scans = SpectrumFile::new(path).load().map_err(|source| EicError::Spectrum {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let points = extract_indexed(features, scans.scans(), &name, settings);
    debug!("{}: {} chromatogram points", name, points.len());
    Ok(points)
}

/// Extract chromatograms from several files, reading them in parallel
///
/// The result is grouped by feature, then by file in the order given.
pub fn extract_files(
    features: &[Feature],
    files: &[PathBuf],
    settings: &EicSettings,
) -> Result<Vec<EicPoint>, EicError> {
    #[cfg(feature = "parallel")]
    let per_file: Vec<Vec<(usize, EicPoint)>> = files
        .par_iter()
        .map(|path| extract_file(path, features, settings))
        .collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let per_file: Vec<Vec<(usize, EicPoint)>> = files
        .iter()
        .map(|path| extract_file(path, features, settings))
        .collect::<Result<_, _>>()?;

    let mut indexed: Vec<(usize, EicPoint)> = per_file.into_iter().flatten().collect();
    // stable: file order survives within a feature
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, point)| point).collect())
}

/// `<dir>/<YYYY_MM_DD>_EIC_CSV.csv`
pub fn default_output_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_EIC_CSV.csv", date.format("%Y_%m_%d")))
}

/// Write chromatogram points as CSV
pub fn write_points(path: &Path, points: &[EicPoint]) -> Result<(), EicError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Feature", "RT", "Intensity", "mz", "File", "Zoom"])?;
    for point in points {
        writer.write_record([
            point.feature.clone(),
            point.retention_time.to_string(),
            point.intensity.to_string(),
            point.mz.to_string(),
            point.file.clone(),
            if point.zoom { "TRUE" } else { "FALSE" }.to_string(),
        ])?;
    }
    writer.flush()?;
    info!("Wrote {} chromatogram points to {}", points.len(), path.display());
    Ok(())
}
