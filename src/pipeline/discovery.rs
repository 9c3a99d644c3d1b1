use std::path::{Path, PathBuf};

use log::warn;

use crate::config::{AcquisitionMode, Polarity};

/// A spectral sample found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// File stem, used to name the output directory
    pub name: String,
    /// MS2 text file
    pub ms2: PathBuf,
    /// Sibling MS1 text file, if present
    pub ms1: Option<PathBuf>,
    /// Acquisition mode inferred from the file name
    pub mode: AcquisitionMode,
    /// Polarity inferred from the file name
    pub polarity: Polarity,
}

/// Infer polarity and acquisition mode from a file stem
///
/// Polarity comes from a `pos`/`neg` token (`Sample_Pos_AIF`), falling back
/// to a `Pos`/`Neg` substring. Names containing `AIF` are AIF, anything else
/// is ddMS.
pub fn classify_file_name(stem: &str) -> Option<(Polarity, AcquisitionMode)> {
    let tokens: Vec<String> = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .map(|t| t.to_ascii_lowercase())
        .collect();

    let polarity = if tokens.iter().any(|t| t == "pos" || t == "positive") {
        Polarity::Positive
    } else if tokens.iter().any(|t| t == "neg" || t == "negative") {
        Polarity::Negative
    } else if stem.contains("Pos") {
        Polarity::Positive
    } else if stem.contains("Neg") {
        Polarity::Negative
    } else {
        return None;
    };

    let mode = if stem.to_ascii_uppercase().contains("AIF") {
        AcquisitionMode::Aif
    } else {
        AcquisitionMode::DdMs
    };
    Some((polarity, mode))
}

/// List `.ms2` files in `dir` (not recursive), sorted by name
pub fn discover_samples(dir: &Path) -> std::io::Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_ms2 = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ms2"));
        if !is_ms2 || !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let Some((polarity, mode)) = classify_file_name(&stem) else {
            warn!("Skipping {}: no polarity in file name", path.display());
            continue;
        };
        let ms1 = path.with_extension("ms1");
        samples.push(Sample {
            name: stem,
            ms1: ms1.is_file().then_some(ms1),
            ms2: path,
            mode,
            polarity,
        });
    }
    samples.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(samples)
}
