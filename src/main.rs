//! # lipidflow
//!
//! Command-line front end for lipid identification by fragment confirmation.
//!
//! ## Usage
//!
//! ```bash
//! # Batch: every sample in a directory against every applicable library
//! lipidflow run --config lipidflow.toml
//!
//! # One spectral file against one library
//! lipidflow match Plasma_01_Pos.ms2 --library PC_H.csv --features PosFeatures.csv --and 4
//!
//! # Extracted ion chromatograms
//! lipidflow eic PosFeatures.csv spectra/
//!
//! # Quick look at a spectral file
//! lipidflow inspect Plasma_01_Pos.ms2
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
