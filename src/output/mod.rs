//! Result files written per pairing.
//!
//! ```text
//! <output>/<sample>/
//! ├── <library>_AllConfirmed.csv   # every matched candidate, or `NoMatches`
//! ├── <library>_Confirmed.csv      # rule-confirmed subset, or `NoConfirmed`
//! └── <library>_RunParameters.json # tolerances, inputs, timestamps
//! ```
//!
//! Both tables share one layout: identity and feature columns, then one block
//! of columns per statistic (`_Confirmed`, `_MaxIntensity`, `_ScanCount`,
//! `_RtAtMax`, `_AverageMz`). AIF confirmed tables append `_AdjR2` and
//! `_Slope` blocks.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aif::CorrelationResult;
use crate::config::{AcquisitionMode, FeatureColumns, MatchConfig, Polarity};
use crate::confirmation::{CandidateEvidence, ConfirmationRule};
use crate::library::Library;
use crate::pipeline::{BatchSummary, PairingOutcome, PairingStatus};

pub use error::OutputError;

mod error;

/// Sentinel written instead of a table when the matcher found nothing
pub const NO_MATCHES: &str = "NoMatches";

/// Sentinel written instead of a table when no row was confirmed
pub const NO_CONFIRMED: &str = "NoConfirmed";

/// Audit record of one pairing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParameters {
    /// Unique run identifier
    pub run_id: Uuid,
    /// Software name
    pub software: String,
    /// Software version
    pub version: String,
    /// When the pairing started
    pub started_at: DateTime<Utc>,
    /// When the pairing finished
    pub finished_at: Option<DateTime<Utc>>,
    /// MS2 file matched
    pub ms2_file: PathBuf,
    /// MS1 file used for AIF correlation
    pub ms1_file: Option<PathBuf>,
    /// Library file
    pub library_file: PathBuf,
    /// Feature table
    pub feature_table: PathBuf,
    /// Acquisition mode
    pub mode: AcquisitionMode,
    /// Polarity
    pub polarity: Polarity,
    /// Tolerances and thresholds
    pub tolerances: MatchConfig,
    /// Feature table layout
    pub feature_columns: FeatureColumns,
    /// Confirmation rule as fragment column names
    pub and_columns: Vec<String>,
    /// Confirmation rule as fragment column names
    pub or_columns: Vec<String>,
    /// Matched candidate rows
    pub matched_rows: usize,
    /// Confirmed rows
    pub confirmed_rows: usize,
}

impl RunParameters {
    /// Start a record for one pairing; counts and `finished_at` are filled by [`Self::finish`]
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        ms2_file: &Path,
        ms1_file: Option<&Path>,
        library_file: &Path,
        feature_table: &Path,
        mode: AcquisitionMode,
        polarity: Polarity,
        tolerances: &MatchConfig,
        feature_columns: &FeatureColumns,
        library: &Library,
        rule: &ConfirmationRule,
    ) -> Self {
        let names = |columns: &std::collections::BTreeSet<usize>| -> Vec<String> {
            columns
                .iter()
                .filter_map(|&c| library.fragment_columns.get(c).map(|f| f.name.clone()))
                .collect()
        };
        Self {
            run_id: Uuid::new_v4(),
            software: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            finished_at: None,
            ms2_file: ms2_file.to_path_buf(),
            ms1_file: ms1_file.map(Path::to_path_buf),
            library_file: library_file.to_path_buf(),
            feature_table: feature_table.to_path_buf(),
            mode,
            polarity,
            tolerances: tolerances.clone(),
            feature_columns: *feature_columns,
            and_columns: names(&rule.and_columns),
            or_columns: names(&rule.or_columns),
            matched_rows: 0,
            confirmed_rows: 0,
        }
    }

    /// Record the outcome and the finish time
    pub fn finish(&mut self, outcome: &PairingOutcome) {
        self.matched_rows = outcome.matched();
        self.confirmed_rows = outcome.confirmed();
        self.finished_at = Some(Utc::now());
    }
}

/// Paths of the files written for one pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingFiles {
    /// Full evidence table
    pub all_confirmed: PathBuf,
    /// Confirmed subset
    pub confirmed: PathBuf,
    /// Run-parameters record
    pub parameters: PathBuf,
}

impl PairingFiles {
    /// Paths under `<output>/<sample>/` for `library`
    pub fn new(output_dir: &Path, sample: &str, library: &str) -> Self {
        let dir = output_dir.join(sample);
        Self {
            all_confirmed: dir.join(format!("{library}_AllConfirmed.csv")),
            confirmed: dir.join(format!("{library}_Confirmed.csv")),
            parameters: dir.join(format!("{library}_RunParameters.json")),
        }
    }
}

/// Column headers of a result table
pub fn table_header(library: &Library, with_correlation: bool) -> Vec<String> {
    let mut header = vec![library.id_header.clone(), library.precursor_header.clone()];
    header.extend(library.metadata_columns.iter().cloned());
    header.extend(
        ["Feature_mz", "Feature_RT", "Feature_Comment", "RT_min", "RT_max"]
            .iter()
            .map(|s| s.to_string()),
    );

    let mut suffixes = vec!["Confirmed", "MaxIntensity", "ScanCount", "RtAtMax", "AverageMz"];
    if with_correlation {
        suffixes.extend(["AdjR2", "Slope"]);
    }
    for suffix in suffixes {
        header.extend(
            library
                .fragment_columns
                .iter()
                .map(|c| format!("{}_{}", c.name, suffix)),
        );
    }
    header
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Cells of one result row, in [`table_header`] order
pub fn row_record(
    row: &CandidateEvidence,
    correlations: Option<&[Option<CorrelationResult>]>,
    with_correlation: bool,
) -> Vec<String> {
    let candidate = &row.candidate;
    let mut record = vec![candidate.entry.id.clone(), candidate.entry.precursor_mz.to_string()];
    record.extend(candidate.entry.metadata.iter().cloned());
    record.extend([
        candidate.feature.mz.to_string(),
        candidate.feature.retention_time.to_string(),
        candidate.feature.comment.clone(),
        candidate.rt_min.to_string(),
        candidate.rt_max.to_string(),
    ]);

    let fragments = &row.fragments;
    record.extend(fragments.iter().map(|f| u8::from(f.confirmed).to_string()));
    record.extend(fragments.iter().map(|f| f.max_intensity.to_string()));
    record.extend(fragments.iter().map(|f| f.scan_count.to_string()));
    record.extend(fragments.iter().map(|f| f.rt_at_max_intensity.to_string()));
    record.extend(fragments.iter().map(|f| f.average_mz.to_string()));

    if with_correlation {
        let result = |i: usize| correlations.and_then(|c| c.get(i).copied().flatten());
        record.extend((0..fragments.len()).map(|i| optional(result(i).and_then(|r| r.adjusted_r_squared))));
        record.extend((0..fragments.len()).map(|i| optional(result(i).and_then(|r| r.slope))));
    }
    record
}

fn write_sentinel(path: &Path, sentinel: &str) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([sentinel])?;
    writer.flush()?;
    Ok(())
}

/// Write both tables of a pairing
pub fn write_tables(
    files: &PairingFiles,
    library: &Library,
    outcome: &PairingOutcome,
    mode: AcquisitionMode,
) -> Result<(), OutputError> {
    if let Some(dir) = files.all_confirmed.parent() {
        fs::create_dir_all(dir)?;
    }

    let (rows, confirmed) = match outcome {
        PairingOutcome::NoMatches => {
            write_sentinel(&files.all_confirmed, NO_MATCHES)?;
            write_sentinel(&files.confirmed, NO_CONFIRMED)?;
            return Ok(());
        }
        PairingOutcome::Evaluated { rows, confirmed } => (rows, confirmed),
    };

    let mut writer = csv::Writer::from_path(&files.all_confirmed)?;
    writer.write_record(table_header(library, false))?;
    for row in rows {
        writer.write_record(row_record(row, None, false))?;
    }
    writer.flush()?;

    if confirmed.is_empty() {
        return write_sentinel(&files.confirmed, NO_CONFIRMED);
    }

    let with_correlation = mode == AcquisitionMode::Aif;
    let mut writer = csv::Writer::from_path(&files.confirmed)?;
    writer.write_record(table_header(library, with_correlation))?;
    for confirmed_row in confirmed {
        writer.write_record(row_record(
            &rows[confirmed_row.row],
            confirmed_row.correlations.as_deref(),
            with_correlation,
        ))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the run-parameters record as pretty-printed JSON
pub fn write_parameters(path: &Path, parameters: &RunParameters) -> Result<(), OutputError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string_pretty(parameters)?)?;
    Ok(())
}

/// Write one line per pairing of a batch
pub fn write_summary(path: &Path, summary: &BatchSummary) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Sample", "Library", "Mode", "Polarity", "Status", "Matched", "Confirmed"])?;
    for report in &summary.reports {
        let (status, matched, confirmed) = match &report.status {
            PairingStatus::NoMatches => (NO_MATCHES.to_string(), 0, 0),
            PairingStatus::Completed { matched, confirmed } => {
                ("Completed".to_string(), *matched, *confirmed)
            }
            PairingStatus::Failed(message) => (format!("Failed: {message}"), 0, 0),
        };
        writer.write_record([
            report.sample.clone(),
            report.library.clone(),
            report.mode.to_string(),
            report.polarity.to_string(),
            status,
            matched.to_string(),
            confirmed.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmation::FragmentEvidence;
    use crate::features::Feature;
    use crate::library::{FragmentColumn, LibraryEntry};
    use crate::matching::MatchedCandidate;
    use crate::pipeline::ConfirmedRow;

    fn library() -> Library {
        Library {
            name: "PC_H".to_string(),
            id_header: "ID".to_string(),
            precursor_header: "Precursor".to_string(),
            fragment_columns: vec![
                FragmentColumn {
                    name: "HG".to_string(),
                    library_column: 3,
                },
                FragmentColumn {
                    name: "NL".to_string(),
                    library_column: 4,
                },
            ],
            metadata_columns: vec!["Class".to_string()],
            entries: vec![],
        }
    }

    fn row() -> CandidateEvidence {
        CandidateEvidence {
            candidate: MatchedCandidate {
                entry_index: 0,
                entry: LibraryEntry {
                    id: "PC(34:1)+H".to_string(),
                    precursor_mz: 760.5851,
                    fragment_mz: vec![Some(184.0733), None],
                    metadata: vec!["PC".to_string()],
                },
                feature: Feature::new(760.5853, 5.0, "101"),
                rt_min: 4.9,
                rt_max: 5.1,
            },
            fragments: vec![
                FragmentEvidence {
                    confirmed: true,
                    max_intensity: 5000.0,
                    scan_count: 1,
                    rt_at_max_intensity: 5.0,
                    average_mz: 184.0735,
                },
                FragmentEvidence::default(),
            ],
        }
    }

    #[test]
    fn test_header_blocks() {
        let header = table_header(&library(), true);
        assert_eq!(&header[..3], &["ID", "Precursor", "Class"]);
        assert_eq!(header[8], "HG_Confirmed");
        assert_eq!(header[9], "NL_Confirmed");
        assert_eq!(header[10], "HG_MaxIntensity");
        assert_eq!(header.last().unwrap(), "NL_Slope");
        assert_eq!(header.len(), 8 + 2 * 7);
    }

    #[test]
    fn test_row_matches_header_width() {
        let correlations = vec![
            Some(CorrelationResult {
                adjusted_r_squared: Some(0.95),
                slope: Some(1.5),
                couples: 6,
            }),
            None,
        ];
        let record = row_record(&row(), Some(&correlations), true);
        assert_eq!(record.len(), table_header(&library(), true).len());
        assert_eq!(record[8], "1");
        assert_eq!(record[9], "0");
        assert_eq!(record[10], "5000");
        assert_eq!(record[18], "0.95");
        assert_eq!(record[19], "");

        let plain = row_record(&row(), None, false);
        assert_eq!(plain.len(), table_header(&library(), false).len());
    }

    #[test]
    fn test_write_tables_and_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let files = PairingFiles::new(dir.path(), "Sample_Pos", "PC_H");

        write_tables(&files, &library(), &PairingOutcome::NoMatches, AcquisitionMode::DdMs).unwrap();
        assert_eq!(fs::read_to_string(&files.all_confirmed).unwrap().trim(), NO_MATCHES);
        assert_eq!(fs::read_to_string(&files.confirmed).unwrap().trim(), NO_CONFIRMED);

        let outcome = PairingOutcome::Evaluated {
            rows: vec![row()],
            confirmed: vec![ConfirmedRow {
                row: 0,
                correlations: None,
            }],
        };
        write_tables(&files, &library(), &outcome, AcquisitionMode::DdMs).unwrap();
        let confirmed = fs::read_to_string(&files.confirmed).unwrap();
        assert_eq!(confirmed.lines().count(), 2);
        assert!(confirmed.starts_with("ID,Precursor,Class,Feature_mz"));

        let unconfirmed = PairingOutcome::Evaluated {
            rows: vec![row()],
            confirmed: vec![],
        };
        write_tables(&files, &library(), &unconfirmed, AcquisitionMode::DdMs).unwrap();
        assert_eq!(fs::read_to_string(&files.all_confirmed).unwrap().lines().count(), 2);
        assert_eq!(fs::read_to_string(&files.confirmed).unwrap().trim(), NO_CONFIRMED);
    }
}
