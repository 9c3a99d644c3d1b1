//! # lipidflow - Lipid Identification by Fragment Confirmation
//!
//! `lipidflow` identifies lipids in LC-MS/MS runs by matching experimental
//! precursor features against theoretical lipid libraries and then
//! confirming each candidate with fragment evidence from the MS/MS scans.
//!
//! ## Key Features
//!
//! - **Streaming spectrum reader**: MS1/MS2 text files are parsed scan by
//!   scan; truncated scans are dropped instead of failing the file.
//!
//! - **Two acquisition modes**: data-dependent MS/MS (precursor-selected
//!   scans) and all-ion fragmentation (AIF), where fragments are additionally
//!   required to co-elute with their precursor.
//!
//! - **Configurable confirmation rules**: per library, a fragment set that
//!   must all be seen (AND) and a set of which any one suffices (OR).
//!
//! - **Batch dispatch**: every (sample, library) pairing runs independently
//!   on a rayon pool; a failing pairing never aborts its siblings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lipidflow::prelude::*;
//!
//! let config = MatchConfig::default();
//! let features = normalize_file("features.csv", &FeatureColumns::default())?;
//! let library = Library::from_file("PC_H.csv", &LibraryLayout::default())?;
//! let scans = SpectrumFile::new("Plasma_01_Pos.ms2").load()?;
//! let rule = ConfirmationRule::new([0].into_iter().collect(), Default::default());
//!
//! let pairing = Pairing {
//!     library: &library,
//!     rule: &rule,
//!     features: &features,
//!     ms2: &scans,
//!     ms1: None,
//!     mode: AcquisitionMode::DdMs,
//! };
//! let outcome = run_pairing(&pairing, &config);
//! println!("{} matched, {} confirmed", outcome.matched(), outcome.confirmed());
//! # Ok::<(), lipidflow::pipeline::PipelineError>(())
//! ```
//!
//! A batch run writes one directory per sample:
//! ```text
//! output/
//! ├── Plasma_01_Pos/
//! │   ├── PC_H_AllConfirmed.csv   # every matched candidate
//! │   ├── PC_H_Confirmed.csv      # rule-confirmed subset
//! │   └── PC_H_RunParameters.json # tolerances and provenance
//! └── BatchSummary.csv
//! ```
//!
//! ## Architecture
//!
//! - [`spectrum`]: MS1/MS2 text reader and in-memory scan sets
//! - [`features`]: feature table normalizer
//! - [`library`]: theoretical libraries and the criteria table
//! - [`matching`]: precursor/RT matcher
//! - [`confirmation`]: fragment evidence and confirmation rules
//! - [`aif`]: MS1/MS2 co-elution regression for AIF data
//! - [`pipeline`]: single pairings, sample discovery and batch dispatch
//! - [`output`]: result tables and run-parameters records
//! - [`eic`]: extracted ion chromatograms
//! - [`config`]: tolerances and table layouts

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod aif;
pub mod config;
pub mod confirmation;
pub mod eic;
pub mod features;
pub mod library;
pub mod matching;
pub mod output;
pub mod pipeline;
pub mod spectrum;

mod table;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::aif::{correlate, CorrelationResult};
    pub use crate::config::{AcquisitionMode, FeatureColumns, MatchConfig, Polarity};
    pub use crate::confirmation::{
        confirm_candidates, CandidateEvidence, ConfirmationRule, FragmentEvidence,
    };
    pub use crate::eic::{EicPoint, EicSettings};
    pub use crate::features::{normalize_file, Feature};
    pub use crate::library::{load_criteria, CriteriaEntry, Library, LibraryLayout};
    pub use crate::matching::{match_library, MatchOutcome, MatchedCandidate};
    pub use crate::pipeline::{
        run_batch, run_pairing, BatchConfig, BatchSummary, Pairing, PairingOutcome,
    };
    pub use crate::spectrum::{Peak, Scan, ScanSet, SpectrumFile};
}
