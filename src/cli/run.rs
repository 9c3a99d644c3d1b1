use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use lipidflow::pipeline::run_batch;

use super::config::Config;

/// Run a batch described by a TOML run file
pub fn run(config_path: PathBuf) -> Result<()> {
    if !config_path.exists() {
        anyhow::bail!("Run file does not exist: {}", config_path.display());
    }

    let base = config_path.parent().unwrap_or(Path::new("."));
    let batch = Config::from_file(&config_path)
        .with_context(|| format!("Failed to load run file {}", config_path.display()))?
        .into_batch_config(base)
        .context("Invalid run file")?;
    info!("Spectra: {}", batch.spectra_dir.display());
    info!("Output: {}", batch.output_dir.display());

    let summary = run_batch(&batch).context("Batch run failed")?;
    print!("{summary}");
    println!("Summary written to {}", batch.output_dir.join("BatchSummary.csv").display());
    Ok(())
}
