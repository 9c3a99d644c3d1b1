//! # Matching Pipeline
//!
//! One *pairing* is one spectral file matched against one library. Pairings
//! share no mutable state, so a batch maps them across a worker pool and only
//! joins at the end to build the [`BatchSummary`].
//!
//! ```text
//! features ─┐
//!           ├─▶ match_library ─▶ confirm_candidates ─▶ rule.select ─▶ (AIF) correlate ─▶ output
//! library  ─┘                          ▲
//! MS2 scans ───────────────────────────┘
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

use crate::aif::{correlate_row, passes_correlation, CorrelationResult};
use crate::config::{AcquisitionMode, MatchConfig};
use crate::confirmation::{confirm_candidates, CandidateEvidence, ConfirmationRule};
use crate::features::Feature;
use crate::library::Library;
use crate::matching::{match_library, MatchOutcome};
use crate::spectrum::ScanSet;

pub use batch::{
    run_batch, write_pairing, BatchConfig, BatchSummary, PairingReport, PairingStatus,
};
pub use discovery::{classify_file_name, discover_samples, Sample};
pub use error::PipelineError;

mod batch;
mod discovery;
mod error;

#[cfg(test)]
mod tests;

/// Inputs of one pairing, borrowed from the batch
#[derive(Debug, Clone, Copy)]
pub struct Pairing<'a> {
    /// Theoretical library
    pub library: &'a Library,
    /// Confirmation rule for this library
    pub rule: &'a ConfirmationRule,
    /// Experimental features of the sample's polarity
    pub features: &'a [Feature],
    /// MS2 scans of the sample
    pub ms2: &'a ScanSet,
    /// MS1 scans, needed for AIF correlation
    pub ms1: Option<&'a ScanSet>,
    /// Acquisition mode of the sample
    pub mode: AcquisitionMode,
}

/// A row that survived confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedRow {
    /// Index into the full evidence table
    pub row: usize,
    /// Correlation per fragment column (AIF with MS1 data only)
    pub correlations: Option<Vec<Option<CorrelationResult>>>,
}

/// Result of one pairing
#[derive(Debug, Clone, PartialEq)]
pub enum PairingOutcome {
    /// The matcher found no library/feature pairs
    NoMatches,
    /// Evidence for every candidate and the subset that was confirmed
    Evaluated {
        /// Full evidence table
        rows: Vec<CandidateEvidence>,
        /// Confirmed subset; empty means "no confirmed"
        confirmed: Vec<ConfirmedRow>,
    },
}

impl PairingOutcome {
    /// Number of matched candidate rows
    pub fn matched(&self) -> usize {
        match self {
            Self::NoMatches => 0,
            Self::Evaluated { rows, .. } => rows.len(),
        }
    }

    /// Number of confirmed rows
    pub fn confirmed(&self) -> usize {
        match self {
            Self::NoMatches => 0,
            Self::Evaluated { confirmed, .. } => confirmed.len(),
        }
    }
}

/// Run matching, confirmation and (for AIF) correlation for one pairing
pub fn run_pairing(pairing: &Pairing<'_>, config: &MatchConfig) -> PairingOutcome {
    let candidates = match match_library(pairing.library, pairing.features, config) {
        MatchOutcome::NoMatches => return PairingOutcome::NoMatches,
        MatchOutcome::Matched(candidates) => candidates,
    };

    let rows = confirm_candidates(pairing.library, &candidates, pairing.ms2, pairing.mode, config);
    let selected = pairing.rule.select(&rows);

    let confirmed = match (pairing.mode, pairing.ms1) {
        (AcquisitionMode::Aif, Some(ms1)) => {
            let columns = pairing.rule.columns();
            selected
                .into_iter()
                .filter_map(|row| {
                    let correlations = correlate_row(&rows[row], &columns, ms1, pairing.ms2, config);
                    passes_correlation(pairing.rule, &correlations, config.min_adjusted_r2).then_some(
                        ConfirmedRow {
                            row,
                            correlations: Some(correlations),
                        },
                    )
                })
                .collect()
        }
        (mode, _) => {
            if mode == AcquisitionMode::Aif {
                warn!(
                    "No MS1 scans for AIF library {}; skipping correlation filter",
                    pairing.library.name
                );
            }
            selected
                .into_iter()
                .map(|row| ConfirmedRow {
                    row,
                    correlations: None,
                })
                .collect()
        }
    };

    PairingOutcome::Evaluated { rows, confirmed }
}
