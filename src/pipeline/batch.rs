use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{discover_samples, run_pairing, Pairing, PairingOutcome, PipelineError, Sample};
use crate::config::{AcquisitionMode, FeatureColumns, MatchConfig, Polarity};
use crate::features::{normalize_file, Feature};
use crate::library::{load_criteria, CriteriaEntry, Library, LibraryLayout};
use crate::output::{self, PairingFiles, RunParameters};
use crate::spectrum::{ScanSet, SpectrumFile};

/// Everything a batch run needs, resolved from the run file
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Tolerances and thresholds
    pub match_config: MatchConfig,
    /// Feature table layout
    pub feature_columns: FeatureColumns,
    /// Library table layout
    pub library_layout: LibraryLayout,
    /// Directory holding `.ms2`/`.ms1` files
    pub spectra_dir: PathBuf,
    /// Directory receiving one subdirectory per sample
    pub output_dir: PathBuf,
    /// Directory holding the library files named by the criteria table
    pub library_dir: PathBuf,
    /// Criteria table
    pub criteria: PathBuf,
    /// Feature table for positive-mode samples
    pub positive_features: Option<PathBuf>,
    /// Feature table for negative-mode samples
    pub negative_features: Option<PathBuf>,
}

impl BatchConfig {
    /// Feature table configured for `polarity`
    pub fn feature_table(&self, polarity: Polarity) -> Option<&Path> {
        match polarity {
            Polarity::Positive => self.positive_features.as_deref(),
            Polarity::Negative => self.negative_features.as_deref(),
        }
    }
}

/// How one pairing ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingStatus {
    /// No library entry matched a feature
    NoMatches,
    /// Evidence was written
    Completed {
        /// Matched candidate rows
        matched: usize,
        /// Confirmed rows
        confirmed: usize,
    },
    /// The pairing failed; siblings were unaffected
    Failed(String),
}

/// One line of the batch summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingReport {
    /// Sample name
    pub sample: String,
    /// Library name
    pub library: String,
    /// Acquisition mode
    pub mode: AcquisitionMode,
    /// Polarity
    pub polarity: Polarity,
    /// Outcome
    pub status: PairingStatus,
}

/// Fan-in of every pairing of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// One report per pairing, ordered by sample then criteria row
    pub reports: Vec<PairingReport>,
    /// Samples discovered
    pub samples: usize,
    /// Wall-clock duration
    pub elapsed_seconds: f64,
}

impl BatchSummary {
    /// Pairings that wrote results
    pub fn completed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| !matches!(r.status, PairingStatus::Failed(_)))
            .count()
    }

    /// Pairings that failed
    pub fn failed(&self) -> usize {
        self.reports.len() - self.completed()
    }

    /// Confirmed rows across all pairings
    pub fn confirmed_rows(&self) -> usize {
        self.reports
            .iter()
            .map(|r| match r.status {
                PairingStatus::Completed { confirmed, .. } => confirmed,
                _ => 0,
            })
            .sum()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} samples, {} pairings ({} failed), {} confirmed rows in {:.2}s",
            self.samples,
            self.reports.len(),
            self.failed(),
            self.confirmed_rows(),
            self.elapsed_seconds
        )?;
        for report in &self.reports {
            let status = match &report.status {
                PairingStatus::NoMatches => "no matches".to_string(),
                PairingStatus::Completed { matched, confirmed } => {
                    format!("{matched} matched, {confirmed} confirmed")
                }
                PairingStatus::Failed(message) => format!("FAILED: {message}"),
            };
            writeln!(
                f,
                "  {} x {} [{} {}]: {}",
                report.sample, report.library, report.mode, report.polarity, status
            )?;
        }
        Ok(())
    }
}

/// Inputs shared read-only by every pairing
struct SharedInputs<'a> {
    config: &'a BatchConfig,
    criteria: &'a [CriteriaEntry],
    libraries: HashMap<&'a str, Result<Library, String>>,
    features: HashMap<Polarity, Result<Vec<Feature>, String>>,
}

/// Run every sample against every applicable library
///
/// Configuration and criteria errors abort before any pairing starts. After
/// that, a failing pairing is recorded in the summary and its siblings carry on.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary, PipelineError> {
    let start = Instant::now();
    config.match_config.validate()?;
    config.feature_columns.validate()?;

    let criteria = load_criteria(&config.criteria)?;
    info!("Loaded {} criteria rows from {}", criteria.len(), config.criteria.display());

    let samples = discover_samples(&config.spectra_dir)?;
    info!("Discovered {} samples in {}", samples.len(), config.spectra_dir.display());

    let inputs = SharedInputs {
        config,
        criteria: &criteria,
        libraries: load_libraries(config, &criteria),
        features: load_features(config),
    };

    #[cfg(feature = "parallel")]
    let per_sample: Vec<Vec<PairingReport>> =
        samples.par_iter().map(|sample| process_sample(sample, &inputs)).collect();
    #[cfg(not(feature = "parallel"))]
    let per_sample: Vec<Vec<PairingReport>> =
        samples.iter().map(|sample| process_sample(sample, &inputs)).collect();

    let summary = BatchSummary {
        reports: per_sample.into_iter().flatten().collect(),
        samples: samples.len(),
        elapsed_seconds: start.elapsed().as_secs_f64(),
    };

    std::fs::create_dir_all(&config.output_dir)?;
    output::write_summary(&config.output_dir.join("BatchSummary.csv"), &summary)?;
    info!(
        "Batch finished: {} pairings, {} failed",
        summary.reports.len(),
        summary.failed()
    );
    Ok(summary)
}

fn load_libraries<'a>(
    config: &BatchConfig,
    criteria: &'a [CriteriaEntry],
) -> HashMap<&'a str, Result<Library, String>> {
    let mut libraries = HashMap::new();
    for entry in criteria {
        libraries.entry(entry.library.as_str()).or_insert_with(|| {
            let path = config.library_dir.join(&entry.library);
            Library::from_file(&path, &config.library_layout).map_err(|e| {
                warn!("Cannot load library {}: {}", path.display(), e);
                e.to_string()
            })
        });
    }
    libraries
}

fn load_features(config: &BatchConfig) -> HashMap<Polarity, Result<Vec<Feature>, String>> {
    [Polarity::Positive, Polarity::Negative]
        .into_iter()
        .map(|polarity| {
            let features = match config.feature_table(polarity) {
                Some(path) => normalize_file(path, &config.feature_columns).map_err(|e| {
                    warn!("Cannot load {} feature table {}: {}", polarity, path.display(), e);
                    e.to_string()
                }),
                None => Err(format!("no feature table configured for {polarity}")),
            };
            (polarity, features)
        })
        .collect()
}

fn load_scans(sample: &Sample) -> Result<(ScanSet, Option<ScanSet>), PipelineError> {
    let ms2 = SpectrumFile::new(&sample.ms2).load()?;
    let ms1 = match (&sample.ms1, sample.mode) {
        (Some(path), AcquisitionMode::Aif) => Some(SpectrumFile::new(path).load()?),
        _ => None,
    };
    Ok((ms2, ms1))
}

fn process_sample(sample: &Sample, inputs: &SharedInputs<'_>) -> Vec<PairingReport> {
    let applicable: Vec<&CriteriaEntry> = inputs
        .criteria
        .iter()
        .filter(|entry| entry.applies_to(sample.mode, sample.polarity))
        .collect();
    if applicable.is_empty() {
        debug!("No criteria rows apply to {}", sample.name);
        return Vec::new();
    }

    let scans = load_scans(sample).map_err(|e| e.to_string());
    applicable
        .into_iter()
        .map(|entry| {
            let status = match &scans {
                Ok((ms2, ms1)) => run_one(sample, entry, ms2, ms1.as_ref(), inputs),
                Err(message) => PairingStatus::Failed(message.clone()),
            };
            if let PairingStatus::Failed(message) = &status {
                warn!("Pairing {} x {} failed: {}", sample.name, entry.library, message);
            }
            PairingReport {
                sample: sample.name.clone(),
                library: entry.library.clone(),
                mode: sample.mode,
                polarity: sample.polarity,
                status,
            }
        })
        .collect()
}

fn run_one(
    sample: &Sample,
    entry: &CriteriaEntry,
    ms2: &ScanSet,
    ms1: Option<&ScanSet>,
    inputs: &SharedInputs<'_>,
) -> PairingStatus {
    let library = match inputs.libraries.get(entry.library.as_str()) {
        Some(Ok(library)) => library,
        Some(Err(message)) => return PairingStatus::Failed(message.clone()),
        None => return PairingStatus::Failed(format!("library {} not loaded", entry.library)),
    };
    let features = match inputs.features.get(&sample.polarity) {
        Some(Ok(features)) => features,
        Some(Err(message)) => return PairingStatus::Failed(message.clone()),
        None => return PairingStatus::Failed(format!("no features for {}", sample.polarity)),
    };

    match write_pairing(sample, entry, library, features, ms2, ms1, inputs.config) {
        Ok(PairingOutcome::NoMatches) => PairingStatus::NoMatches,
        Ok(outcome) => PairingStatus::Completed {
            matched: outcome.matched(),
            confirmed: outcome.confirmed(),
        },
        Err(e) => PairingStatus::Failed(e.to_string()),
    }
}

/// Evaluate one pairing and write its tables and run-parameters record
///
/// Library and feature paths recorded in the run parameters are taken from
/// `config`.
pub fn write_pairing(
    sample: &Sample,
    entry: &CriteriaEntry,
    library: &Library,
    features: &[Feature],
    ms2: &ScanSet,
    ms1: Option<&ScanSet>,
    config: &BatchConfig,
) -> Result<PairingOutcome, PipelineError> {
    let rule = library.rule_for(entry)?;

    let feature_table = config.feature_table(sample.polarity).unwrap_or(Path::new(""));
    let mut parameters = RunParameters::start(
        &sample.ms2,
        sample.ms1.as_deref(),
        &config.library_dir.join(&entry.library),
        feature_table,
        sample.mode,
        sample.polarity,
        &config.match_config,
        &config.feature_columns,
        library,
        &rule,
    );

    let pairing = Pairing {
        library,
        rule: &rule,
        features,
        ms2,
        ms1,
        mode: sample.mode,
    };
    let outcome = run_pairing(&pairing, &config.match_config);
    parameters.finish(&outcome);

    let files = PairingFiles::new(&config.output_dir, &sample.name, &library.name);
    output::write_tables(&files, library, &outcome, sample.mode)?;
    output::write_parameters(&files.parameters, &parameters)?;
    info!(
        "{} x {}: {} matched, {} confirmed",
        sample.name,
        library.name,
        outcome.matched(),
        outcome.confirmed()
    );
    Ok(outcome)
}
