//! # Spectrum Reader
//!
//! Streaming parser for the MS1/MS2 text format produced by ProteoWizard
//! msconvert. A file looks like:
//!
//! ```text
//! H   CreationDate    ...          <- preamble, skipped
//! S   000012  000012  760.5850     <- scan boundary (precursor only in MS2)
//! I   NativeID        scan=12
//! I   RTime           5.0012       <- retention time in minutes
//! Z   1               760.5850     <- optional charge block
//! 184.0735 5000                    <- peak list
//! 224.1012 812
//! ```
//!
//! Scans whose peak list holds no valid `(m/z, intensity)` pair are dropped.

use std::fs::File;
use std::io::BufReader;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::config::{boundary_slack, within_tolerance};

pub use error::SpectrumError;
pub use reader::{Ms2Reader, ScanIterator};

mod error;
mod reader;


/// A single centroided peak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Mass-to-charge ratio
    pub mz: f64,
    /// Signal intensity
    pub intensity: f64,
}

impl Peak {
    /// Create a new peak
    pub fn new(mz: f64, intensity: f64) -> Self {
        Self { mz, intensity }
    }
}

/// One parsed scan
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    /// Native scan number from the boundary line
    pub scan_number: u64,
    /// Retention time in minutes
    pub retention_time: f64,
    /// Isolated precursor m/z (MS2 data-dependent scans only)
    pub precursor_mz: Option<f64>,
    /// Peak list in file order
    pub peaks: Vec<Peak>,
}

impl Scan {
    /// Peaks whose m/z lies within `±tolerance` of `target` (inclusive)
    pub fn peaks_within(&self, target: f64, tolerance: f64) -> impl Iterator<Item = &Peak> {
        self.peaks
            .iter()
            .filter(move |p| within_tolerance(p.mz, target, tolerance))
    }
}

/// Scans of one file held in memory, ordered by retention time
#[derive(Debug, Clone, Default)]
pub struct ScanSet {
    scans: Vec<Scan>,
}

impl ScanSet {
    /// Build a set from scans in any order
    pub fn new(mut scans: Vec<Scan>) -> Self {
        // stable, so equal RTs keep file order
        scans.sort_by(|a, b| a.retention_time.total_cmp(&b.retention_time));
        Self { scans }
    }

    /// Number of scans
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// True if no scans survived parsing
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// All scans in retention-time order
    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    /// Scans with `rt_min <= retention_time <= rt_max`
    ///
    /// Both bounds are widened by [`boundary_slack`] so a scan on a decimal
    /// bound is kept.
    pub fn window(&self, rt_min: f64, rt_max: f64) -> &[Scan] {
        if rt_min > rt_max {
            return &[];
        }
        let lo = rt_min - boundary_slack(rt_min);
        let hi = rt_max + boundary_slack(rt_max);
        let start = self.scans.partition_point(|s| s.retention_time < lo);
        let end = self.scans.partition_point(|s| s.retention_time <= hi);
        &self.scans[start..end.max(start)]
    }

    /// Retention-time span covered by the set
    pub fn rt_range(&self) -> Option<RangeInclusive<f64>> {
        match (self.scans.first(), self.scans.last()) {
            (Some(first), Some(last)) => Some(first.retention_time..=last.retention_time),
            _ => None,
        }
    }

    /// Number of scans that carry a precursor m/z
    pub fn precursor_scan_count(&self) -> usize {
        self.scans.iter().filter(|s| s.precursor_mz.is_some()).count()
    }

    /// Total number of peaks across every scan
    pub fn peak_count(&self) -> usize {
        self.scans.iter().map(|s| s.peaks.len()).sum()
    }
}

impl FromIterator<Scan> for ScanSet {
    fn from_iter<I: IntoIterator<Item = Scan>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A spectral file on disk that can be streamed any number of times
#[derive(Debug, Clone)]
pub struct SpectrumFile {
    path: PathBuf,
}

impl SpectrumFile {
    /// Refer to the file at `path` (opened lazily)
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a fresh pass over the file's scans
    pub fn scans(&self) -> Result<ScanIterator<BufReader<File>>, SpectrumError> {
        let file = File::open(&self.path)?;
        Ok(Ms2Reader::new(BufReader::new(file)).scans())
    }

    /// Read every scan into a [`ScanSet`]
    pub fn load(&self) -> Result<ScanSet, SpectrumError> {
        let scans = self.scans()?.collect::<Result<Vec<_>, _>>()?;
        log::debug!("Loaded {} scans from {}", scans.len(), self.path.display());
        Ok(ScanSet::new(scans))
    }
}
