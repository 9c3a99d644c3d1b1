use serde::{Deserialize, Serialize};

use crate::config::{within_tolerance, AcquisitionMode, MatchConfig};
use crate::library::Library;
use crate::matching::MatchedCandidate;
use crate::spectrum::{Scan, ScanSet};

/// Evidence for one fragment of one candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentEvidence {
    /// Intensity and scan-count thresholds were both met
    pub confirmed: bool,
    /// Highest accepted peak intensity
    pub max_intensity: f64,
    /// Number of qualifying scans carrying at least one accepted peak
    pub scan_count: usize,
    /// Retention time of the scan holding `max_intensity`
    pub rt_at_max_intensity: f64,
    /// Mean m/z of every accepted peak
    pub average_mz: f64,
}

/// A candidate together with per-fragment evidence
///
/// `fragments` is aligned with [`Library::fragment_columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvidence {
    /// The matched candidate
    pub candidate: MatchedCandidate,
    /// Evidence per fragment column
    pub fragments: Vec<FragmentEvidence>,
}

impl CandidateEvidence {
    /// Binary confirmation flags per fragment column
    pub fn flags(&self) -> Vec<bool> {
        self.fragments.iter().map(|f| f.confirmed).collect()
    }
}

/// Scans of `scans` that may carry fragments of `candidate`
///
/// Always restricted to `[rt_min, rt_max]`. In ddMS mode the scan's isolated
/// precursor must also lie within `±selection_accuracy/2` of the candidate
/// precursor; AIF has no per-scan isolation.
pub fn qualifying_scans<'a>(
    candidate: &'a MatchedCandidate,
    scans: &'a ScanSet,
    mode: AcquisitionMode,
    config: &MatchConfig,
) -> impl Iterator<Item = &'a Scan> + 'a {
    let selection = config.selection_half_tolerance();
    let precursor = candidate.precursor_mz();
    scans
        .window(candidate.rt_min, candidate.rt_max)
        .iter()
        .filter(move |scan| match mode {
            AcquisitionMode::Aif => true,
            AcquisitionMode::DdMs => scan
                .precursor_mz
                .is_some_and(|mz| within_tolerance(mz, precursor, selection)),
        })
}

/// Summarize the peaks matching `theoretical_mz` across `scans`
pub fn fragment_evidence<'a, I>(
    scans: I,
    theoretical_mz: f64,
    min_scans: usize,
    config: &MatchConfig,
) -> FragmentEvidence
where
    I: IntoIterator<Item = &'a Scan>,
{
    let tolerance = config.fragment_tolerance(theoretical_mz);
    let mut evidence = FragmentEvidence::default();
    let mut mz_sum = 0.0;
    let mut accepted = 0usize;
    let mut any_accepted = false;

    for scan in scans {
        let mut in_scan = false;
        for peak in scan.peaks_within(theoretical_mz, tolerance) {
            if !any_accepted || peak.intensity > evidence.max_intensity {
                evidence.max_intensity = peak.intensity;
                evidence.rt_at_max_intensity = scan.retention_time;
            }
            any_accepted = true;
            in_scan = true;
            mz_sum += peak.mz;
            accepted += 1;
        }
        if in_scan {
            evidence.scan_count += 1;
        }
    }

    if accepted > 0 {
        evidence.average_mz = mz_sum / accepted as f64;
    }
    evidence.confirmed = any_accepted
        && evidence.max_intensity > config.intensity_cutoff
        && evidence.scan_count >= min_scans;
    evidence
}

/// Compute fragment evidence for every candidate and fragment column
pub fn confirm_candidates(
    library: &Library,
    candidates: &[MatchedCandidate],
    scans: &ScanSet,
    mode: AcquisitionMode,
    config: &MatchConfig,
) -> Vec<CandidateEvidence> {
    let min_scans = config.min_scans(mode);
    candidates
        .iter()
        .map(|candidate| {
            let window: Vec<&Scan> = qualifying_scans(candidate, scans, mode, config).collect();
            let fragments = (0..library.fragment_columns.len())
                .map(|column| match candidate.entry.fragment_mz.get(column).copied().flatten() {
                    Some(mz) => fragment_evidence(window.iter().copied(), mz, min_scans, config),
                    None => FragmentEvidence::default(),
                })
                .collect();
            CandidateEvidence {
                candidate: candidate.clone(),
                fragments,
            }
        })
        .collect()
}
