use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use lipidflow::config::{AcquisitionMode, FeatureColumns, MatchConfig, Polarity};
use lipidflow::features::normalize_file;
use lipidflow::library::{CriteriaEntry, Library, LibraryLayout};
use lipidflow::output::PairingFiles;
use lipidflow::pipeline::{classify_file_name, write_pairing, BatchConfig, PairingOutcome, Sample};
use lipidflow::spectrum::SpectrumFile;

/// Arguments of the `match` subcommand
pub struct MatchArgs {
    pub ms2: PathBuf,
    pub ms1: Option<PathBuf>,
    pub library: PathBuf,
    pub features: PathBuf,
    pub output: PathBuf,
    pub mode: Option<AcquisitionMode>,
    pub polarity: Option<Polarity>,
    pub and_columns: Vec<usize>,
    pub or_columns: Vec<usize>,
    pub match_config: MatchConfig,
    pub feature_columns: FeatureColumns,
}

/// Match one spectral file against one library
pub fn run(args: MatchArgs) -> Result<()> {
    args.match_config.validate()?;
    args.feature_columns.validate()?;
    for path in [&args.ms2, &args.library, &args.features] {
        if !path.exists() {
            anyhow::bail!("File does not exist: {}", path.display());
        }
    }

    let stem = file_stem(&args.ms2);
    let inferred = classify_file_name(&stem);
    let polarity = args
        .polarity
        .or(inferred.map(|(p, _)| p))
        .context("Cannot infer polarity from the file name; pass --polarity")?;
    let mode = args
        .mode
        .or(inferred.map(|(_, m)| m))
        .unwrap_or(AcquisitionMode::DdMs);

    let ms1 = args.ms1.clone().or_else(|| {
        let sibling = args.ms2.with_extension("ms1");
        sibling.is_file().then_some(sibling)
    });
    let sample = Sample {
        name: stem,
        ms2: args.ms2.clone(),
        ms1,
        mode,
        polarity,
    };

    let library_dir = args.library.parent().unwrap_or(Path::new(".")).to_path_buf();
    let entry = CriteriaEntry {
        library: args
            .library
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        mode,
        polarity,
        and_columns: args.and_columns,
        or_columns: args.or_columns,
    };

    let library = Library::from_file(&args.library, &LibraryLayout::default())
        .with_context(|| format!("Failed to read library {}", args.library.display()))?;
    let features = normalize_file(&args.features, &args.feature_columns)
        .with_context(|| format!("Failed to read feature table {}", args.features.display()))?;
    let ms2 = SpectrumFile::new(&sample.ms2)
        .load()
        .with_context(|| format!("Failed to read {}", sample.ms2.display()))?;
    let ms1 = match (&sample.ms1, mode) {
        (Some(path), AcquisitionMode::Aif) => Some(
            SpectrumFile::new(path)
                .load()
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        _ => None,
    };

    let config = BatchConfig {
        match_config: args.match_config,
        feature_columns: args.feature_columns,
        library_layout: LibraryLayout::default(),
        spectra_dir: sample.ms2.parent().unwrap_or(Path::new(".")).to_path_buf(),
        output_dir: args.output,
        library_dir,
        criteria: PathBuf::new(),
        positive_features: Some(args.features.clone()),
        negative_features: Some(args.features),
    };

    let outcome = write_pairing(&sample, &entry, &library, &features, &ms2, ms1.as_ref(), &config)?;
    let files = PairingFiles::new(&config.output_dir, &sample.name, &library.name);
    match outcome {
        PairingOutcome::NoMatches => println!("No library entry matched a feature"),
        ref evaluated => println!(
            "{} matched, {} confirmed",
            evaluated.matched(),
            evaluated.confirmed()
        ),
    }
    println!("Results written to {}", files.all_confirmed.parent().unwrap_or(Path::new(".")).display());
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
