use anyhow::{Context, Result};
use std::path::PathBuf;

use lipidflow::pipeline::classify_file_name;
use lipidflow::spectrum::SpectrumFile;

/// Print scan statistics of a spectral text file
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let scans = SpectrumFile::new(&file)
        .load()
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("Spectral File Information");
    println!("=========================");
    println!("File: {}", file.display());
    println!();
    println!("Scans: {}", scans.len());
    println!("Peaks: {}", scans.peak_count());
    match scans.rt_range() {
        Some(range) => println!("RT range: {:.4} - {:.4} min", range.start(), range.end()),
        None => println!("RT range: <empty>"),
    }
    let level = if scans.precursor_scan_count() > 0 { "MS2" } else { "MS1" };
    println!(
        "MS level: {} ({} scans with a precursor)",
        level,
        scans.precursor_scan_count()
    );

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match classify_file_name(&stem) {
        Some((polarity, mode)) => println!("File name reads as: {} {}", polarity, mode),
        None => println!("File name reads as: <no polarity token>"),
    }
    Ok(())
}
