//! # Fragment Confirmation
//!
//! Two stages run for every matched candidate:
//!
//! 1. [`confirm_candidates`] scans the retention-time window (and, for ddMS,
//!    the precursor isolation window) for peaks within the ppm tolerance of
//!    each theoretical fragment and summarizes them as [`FragmentEvidence`].
//! 2. A [`ConfirmationRule`] combines the per-fragment flags into a keep/drop
//!    decision for the row.

pub use engine::{
    confirm_candidates, fragment_evidence, qualifying_scans, CandidateEvidence, FragmentEvidence,
};
pub use rules::ConfirmationRule;

mod engine;
mod rules;

#[cfg(test)]
mod tests;
