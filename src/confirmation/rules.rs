use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::CandidateEvidence;

/// AND/OR groups of fragment columns that decide confirmation
///
/// A row passes when every AND column is confirmed and at least one OR
/// column is confirmed. An empty group is vacuously satisfied, so a rule
/// with both groups empty retains every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRule {
    /// Fragment indices that must all be confirmed
    pub and_columns: BTreeSet<usize>,
    /// Fragment indices of which one must be confirmed
    pub or_columns: BTreeSet<usize>,
}

impl ConfirmationRule {
    /// Create a rule from fragment indices
    pub fn new(and_columns: BTreeSet<usize>, or_columns: BTreeSet<usize>) -> Self {
        Self {
            and_columns,
            or_columns,
        }
    }

    /// True if neither group names a column
    pub fn is_empty(&self) -> bool {
        self.and_columns.is_empty() && self.or_columns.is_empty()
    }

    /// Every column named by either group
    pub fn columns(&self) -> BTreeSet<usize> {
        self.and_columns.union(&self.or_columns).copied().collect()
    }

    /// All AND columns confirmed (true when the group is empty)
    pub fn and_truth(&self, flags: &[bool]) -> bool {
        self.and_columns.iter().all(|&c| flag(flags, c))
    }

    /// Any OR column confirmed (true when the group is empty)
    pub fn or_truth(&self, flags: &[bool]) -> bool {
        self.or_columns.is_empty() || self.or_columns.iter().any(|&c| flag(flags, c))
    }

    /// Decide a row from its per-fragment confirmation flags
    pub fn is_satisfied(&self, flags: &[bool]) -> bool {
        self.and_truth(flags) && self.or_truth(flags)
    }

    /// Indices of the rows in `rows` that satisfy the rule
    pub fn select(&self, rows: &[CandidateEvidence]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.is_satisfied(&row.flags()))
            .map(|(i, _)| i)
            .collect()
    }
}

// columns beyond the flag vector count as unconfirmed
fn flag(flags: &[bool], column: usize) -> bool {
    flags.get(column).copied().unwrap_or(false)
}
