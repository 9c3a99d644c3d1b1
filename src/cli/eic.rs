use anyhow::{Context, Result};
use std::path::PathBuf;

use lipidflow::config::FeatureColumns;
use lipidflow::eic::{default_output_path, extract_files, spectral_files, write_points, EicSettings};
use lipidflow::features::normalize_file;

/// Write extracted ion chromatograms for every feature of a feature table
pub fn run(
    features: PathBuf,
    spectra_dir: PathBuf,
    output: Option<PathBuf>,
    settings: EicSettings,
    columns: FeatureColumns,
) -> Result<()> {
    settings.validate()?;
    columns.validate()?;

    let features = normalize_file(&features, &columns)
        .with_context(|| format!("Failed to read feature table {}", features.display()))?;
    let files = spectral_files(&spectra_dir)
        .with_context(|| format!("Failed to list {}", spectra_dir.display()))?;
    if files.is_empty() {
        anyhow::bail!("No .ms1/.ms2 files in {}", spectra_dir.display());
    }

    let points = extract_files(&features, &files, &settings)?;
    let output = output
        .unwrap_or_else(|| default_output_path(&spectra_dir, chrono::Local::now().date_naive()));
    write_points(&output, &points)?;

    println!(
        "{} features x {} files: {} points written to {}",
        features.len(),
        files.len(),
        points.len(),
        output.display()
    );
    Ok(())
}
