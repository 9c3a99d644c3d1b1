//! # Library Matcher
//!
//! Joins library precursors against experimental features within
//! `±precursor_mass_accuracy/2` and attaches a retention-time acceptance
//! window to every match. A library entry close to several features fans out
//! into several candidates.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::{boundary_slack, within_tolerance, MatchConfig};
use crate::features::Feature;
use crate::library::{Library, LibraryEntry};

/// A library entry joined with one experimental feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedCandidate {
    /// Position of the entry in [`Library::entries`]
    pub entry_index: usize,
    /// The matched library entry
    pub entry: LibraryEntry,
    /// The matched experimental feature
    pub feature: Feature,
    /// Lower retention-time bound (inclusive)
    pub rt_min: f64,
    /// Upper retention-time bound (inclusive)
    pub rt_max: f64,
}

impl MatchedCandidate {
    /// Theoretical precursor m/z of the candidate species
    pub fn precursor_mz(&self) -> f64 {
        self.entry.precursor_mz
    }
}

/// Result of matching one library against one feature list
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// No library precursor fell within tolerance of any feature
    NoMatches,
    /// One or more candidates, in library order then feature order
    Matched(Vec<MatchedCandidate>),
}

impl MatchOutcome {
    /// Matched candidates, empty for [`MatchOutcome::NoMatches`]
    pub fn candidates(&self) -> &[MatchedCandidate] {
        match self {
            Self::NoMatches => &[],
            Self::Matched(candidates) => candidates,
        }
    }

    /// Number of matched candidates
    pub fn len(&self) -> usize {
        self.candidates().len()
    }

    /// True for [`MatchOutcome::NoMatches`]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoMatches)
    }
}

/// Match every entry of `library` against `features`
pub fn match_library(library: &Library, features: &[Feature], config: &MatchConfig) -> MatchOutcome {
    let tolerance = config.precursor_half_tolerance();
    let half_window = config.rt_half_window();

    let mut by_mz: Vec<usize> = (0..features.len()).collect();
    by_mz.sort_by(|&a, &b| features[a].mz.total_cmp(&features[b].mz));

    let mut candidates = Vec::new();
    for (entry_index, entry) in library.entries.iter().enumerate() {
        let slack = boundary_slack(entry.precursor_mz);
        let lo = entry.precursor_mz - tolerance - slack;
        let hi = entry.precursor_mz + tolerance + slack;
        let start = by_mz.partition_point(|&i| features[i].mz < lo);

        let mut hits: Vec<usize> = by_mz[start..]
            .iter()
            .copied()
            .take_while(|&i| features[i].mz <= hi)
            .filter(|&i| within_tolerance(features[i].mz, entry.precursor_mz, tolerance))
            .collect();
        hits.sort_unstable();

        for i in hits {
            let feature = &features[i];
            candidates.push(MatchedCandidate {
                entry_index,
                entry: entry.clone(),
                feature: feature.clone(),
                rt_min: feature.retention_time - half_window,
                rt_max: feature.retention_time + half_window,
            });
        }
    }

    if candidates.is_empty() {
        info!("No precursor matches between library {} and {} features", library.name, features.len());
        MatchOutcome::NoMatches
    } else {
        debug!("Library {}: {} candidate rows", library.name, candidates.len());
        MatchOutcome::Matched(candidates)
    }
}
