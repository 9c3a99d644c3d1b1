//! # AIF Correlation
//!
//! All-ion fragmentation has no precursor isolation, so a fragment found in
//! an MS2 scan can come from any co-eluting species. Here the precursor's MS1
//! intensity is regressed against the fragment's MS2 intensity across the
//! retention-time window; a real precursor/fragment pair rises and falls
//! together.
//!
//! MS1 and MS2 scans interleave (`MS1 n`, `MS2 n+1`, `MS1 n+2`, ...), so
//! adjacent MS1 points are averaged and keyed by their mean scan number,
//! which lines up with the MS2 scan in between.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::confirmation::{CandidateEvidence, ConfirmationRule};
use crate::spectrum::{Scan, ScanSet};

pub use regression::{linear_fit, round_to, LinearFit};

mod regression;

/// Regression diagnostics for one candidate fragment
///
/// Both values are `None` when too few MS1/MS2 couples were found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Adjusted R², rounded to 3 decimals
    pub adjusted_r_squared: Option<f64>,
    /// Slope of MS2 on MS1 intensity, rounded to 5 decimals
    pub slope: Option<f64>,
    /// Aligned pairs with both intensities non-zero
    pub couples: usize,
}

impl CorrelationResult {
    /// Copy with non-positive slopes removed
    pub fn with_positive_slope(self) -> Self {
        Self {
            slope: self.slope.filter(|&s| s > 0.0),
            ..self
        }
    }

    /// Positive slope and adjusted R² above `min_adjusted_r2`
    pub fn passes(&self, min_adjusted_r2: f64) -> bool {
        self.slope.is_some_and(|s| s > 0.0)
            && self.adjusted_r_squared.is_some_and(|r| r > min_adjusted_r2)
    }
}

/// Intensity of the peak nearest `target` within `tolerance`
///
/// Equidistant peaks are averaged. Returns `(intensity, m/z)`.
pub fn nearest_peak(scan: &Scan, target: f64, tolerance: f64) -> Option<(f64, f64)> {
    let mut best: Option<f64> = None;
    let mut sum_intensity = 0.0;
    let mut sum_mz = 0.0;
    let mut count = 0usize;

    for peak in scan.peaks_within(target, tolerance) {
        let distance = (peak.mz - target).abs();
        match best {
            Some(d) if distance > d => continue,
            Some(d) if distance == d => {}
            _ => {
                best = Some(distance);
                sum_intensity = 0.0;
                sum_mz = 0.0;
                count = 0;
            }
        }
        sum_intensity += peak.intensity;
        sum_mz += peak.mz;
        count += 1;
    }

    (count > 0).then(|| (sum_intensity / count as f64, sum_mz / count as f64))
}

/// `(scan number, intensity)` for every scan, 0 when no peak matches
pub fn intensity_series(scans: &[Scan], target: f64, config: &MatchConfig) -> Vec<(u64, f64)> {
    let tolerance = config.fragment_tolerance(target);
    let mut series: Vec<(u64, f64)> = scans
        .iter()
        .map(|scan| {
            let intensity = nearest_peak(scan, target, tolerance).map_or(0.0, |(i, _)| i);
            (scan.scan_number, intensity)
        })
        .collect();
    series.sort_by_key(|&(scan, _)| scan);
    series
}

/// Pair averaged adjacent MS1 points with the MS2 point at their mean scan number
///
/// Returns `(ms1 intensity, ms2 intensity)` in MS2 scan order.
pub fn align_series(ms1: &[(u64, f64)], ms2: &[(u64, f64)]) -> Vec<(f64, f64)> {
    // keyed by doubled scan number so odd sums never collide with an MS2 scan
    let averaged: HashMap<u64, f64> = ms1
        .windows(2)
        .map(|w| (w[0].0 + w[1].0, (w[0].1 + w[1].1) / 2.0))
        .collect();

    ms2.iter()
        .filter_map(|&(scan, intensity)| averaged.get(&(scan * 2)).map(|&ms1| (ms1, intensity)))
        .collect()
}

/// Correlate one precursor/fragment pair over the given scan windows
pub fn correlate(
    ms1_scans: &[Scan],
    ms2_scans: &[Scan],
    precursor_mz: f64,
    fragment_mz: f64,
    config: &MatchConfig,
) -> CorrelationResult {
    let ms1 = intensity_series(ms1_scans, precursor_mz, config);
    let ms2 = intensity_series(ms2_scans, fragment_mz, config);
    let aligned = align_series(&ms1, &ms2);

    let couples = aligned.iter().filter(|&&(a, b)| a != 0.0 && b != 0.0).count();
    if couples < config.min_aif_scans {
        return CorrelationResult {
            couples,
            ..Default::default()
        };
    }

    match linear_fit(&aligned) {
        Some(fit) => CorrelationResult {
            adjusted_r_squared: fit.adjusted_r_squared.map(|r| round_to(r, 3)),
            slope: Some(round_to(fit.slope, 5)),
            couples,
        },
        None => CorrelationResult {
            couples,
            ..Default::default()
        },
    }
}

/// Correlation diagnostics for every rule column of a confirmed row
///
/// The result is aligned with the library's fragment columns; columns the
/// rule does not name, or without a theoretical m/z, stay `None`.
pub fn correlate_row(
    row: &CandidateEvidence,
    columns: &BTreeSet<usize>,
    ms1: &ScanSet,
    ms2: &ScanSet,
    config: &MatchConfig,
) -> Vec<Option<CorrelationResult>> {
    let candidate = &row.candidate;
    let ms1_window = ms1.window(candidate.rt_min, candidate.rt_max);
    let ms2_window = ms2.window(candidate.rt_min, candidate.rt_max);

    (0..row.fragments.len())
        .map(|column| {
            if !columns.contains(&column) {
                return None;
            }
            let fragment_mz = candidate.entry.fragment_mz.get(column).copied().flatten()?;
            let result = correlate(ms1_window, ms2_window, candidate.precursor_mz(), fragment_mz, config);
            Some(result.with_positive_slope())
        })
        .collect()
}

/// Re-apply the rule to correlation diagnostics
///
/// A row survives when every AND column passes, or when any OR column
/// passes. Empty groups do not count as passing here unless both are empty.
pub fn passes_correlation(
    rule: &ConfirmationRule,
    correlations: &[Option<CorrelationResult>],
    min_adjusted_r2: f64,
) -> bool {
    if rule.is_empty() {
        return true;
    }
    let passes = |column: &usize| {
        correlations
            .get(*column)
            .copied()
            .flatten()
            .is_some_and(|c| c.passes(min_adjusted_r2))
    };
    let and_ok = !rule.and_columns.is_empty() && rule.and_columns.iter().all(passes);
    let or_ok = !rule.or_columns.is_empty() && rule.or_columns.iter().any(passes);
    and_ok || or_ok
}
