use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lipidflow::config::{AcquisitionMode, Polarity};

mod config;
mod eic;
mod inspect;
mod run;
mod single;

/// lipidflow - lipid identification by fragment confirmation
#[derive(Parser)]
#[command(name = "lipidflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every sample in a directory against the libraries of a criteria table
    Run {
        /// TOML run file
        #[arg(short, long, value_name = "FILE", default_value = "lipidflow.toml")]
        config: PathBuf,
    },

    /// Match one spectral file against one library
    Match {
        /// MS2 text file
        #[arg(value_name = "MS2")]
        ms2: PathBuf,

        /// Library table
        #[arg(short, long)]
        library: PathBuf,

        /// Feature table
        #[arg(short, long)]
        features: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// MS1 text file for AIF correlation (defaults to the sibling .ms1)
        #[arg(long)]
        ms1: Option<PathBuf>,

        /// Acquisition mode (ddMS or AIF); inferred from the file name if omitted
        #[arg(long)]
        mode: Option<AcquisitionMode>,

        /// Polarity (Pos or Neg); inferred from the file name if omitted
        #[arg(long)]
        polarity: Option<Polarity>,

        /// 1-based library columns that must all be confirmed
        #[arg(long = "and", value_delimiter = ',')]
        and_columns: Vec<usize>,

        /// 1-based library columns of which one must be confirmed
        #[arg(long = "or", value_delimiter = ',')]
        or_columns: Vec<usize>,

        /// Full retention-time window (minutes)
        #[arg(long, default_value = "0.3")]
        rt_window: f64,

        /// Full fragment window (ppm)
        #[arg(long, default_value = "10")]
        ppm_window: f64,

        /// Full precursor tolerance (Da)
        #[arg(long, default_value = "0.01")]
        precursor_accuracy: f64,

        /// Full precursor isolation tolerance (Da)
        #[arg(long, default_value = "1")]
        selection_accuracy: f64,

        /// Intensity a fragment must exceed
        #[arg(long, default_value = "1000")]
        intensity_cutoff: f64,

        /// Minimum scans per fragment (ddMS)
        #[arg(long, default_value = "1")]
        scan_cutoff: usize,

        /// Minimum scans (AIF) and MS1/MS2 couples for correlation
        #[arg(long, default_value = "5")]
        min_aif_scans: usize,

        /// Minimum adjusted R² for AIF correlation
        #[arg(long, default_value = "0.6")]
        min_adj_r2: f64,

        /// 1-based m/z column of the feature table
        #[arg(long, default_value = "1")]
        mz_column: usize,

        /// 1-based retention-time column of the feature table
        #[arg(long, default_value = "2")]
        rt_column: usize,

        /// 1-based comment column of the feature table
        #[arg(long, default_value = "3")]
        comment_column: usize,

        /// First data row of the feature table
        #[arg(long, default_value = "2")]
        first_data_row: usize,
    },

    /// Write extracted ion chromatograms for every feature
    Eic {
        /// Feature table
        #[arg(value_name = "FEATURES")]
        features: PathBuf,

        /// Directory of .ms1/.ms2 files (also the default output location)
        #[arg(value_name = "DIR")]
        spectra_dir: PathBuf,

        /// Output CSV (defaults to <DIR>/<YYYY_MM_DD>_EIC_CSV.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Absolute m/z tolerance (Da)
        #[arg(long, default_value = "0.005")]
        mz_tolerance: f64,

        /// Retention-time zoom window (minutes)
        #[arg(long, default_value = "0.5")]
        zoom_window: f64,

        /// 1-based m/z column of the feature table
        #[arg(long, default_value = "1")]
        mz_column: usize,

        /// 1-based retention-time column of the feature table
        #[arg(long, default_value = "2")]
        rt_column: usize,

        /// 1-based feature identifier column
        #[arg(long, default_value = "3")]
        id_column: usize,

        /// First data row of the feature table
        #[arg(long, default_value = "2")]
        first_data_row: usize,
    },

    /// Summarize a spectral text file
    Inspect {
        /// MS1 or MS2 text file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { config } => run::run(config),
        Commands::Match {
            ms2,
            library,
            features,
            output,
            ms1,
            mode,
            polarity,
            and_columns,
            or_columns,
            rt_window,
            ppm_window,
            precursor_accuracy,
            selection_accuracy,
            intensity_cutoff,
            scan_cutoff,
            min_aif_scans,
            min_adj_r2,
            mz_column,
            rt_column,
            comment_column,
            first_data_row,
        } => single::run(single::MatchArgs {
            ms2,
            ms1,
            library,
            features,
            output,
            mode,
            polarity,
            and_columns,
            or_columns,
            match_config: lipidflow::config::MatchConfig {
                retention_time_window: rt_window,
                ppm_window,
                precursor_mass_accuracy: precursor_accuracy,
                selection_accuracy,
                intensity_cutoff,
                scan_cutoff,
                min_aif_scans,
                min_adjusted_r2: min_adj_r2,
            },
            feature_columns: lipidflow::config::FeatureColumns {
                mz_column,
                rt_column,
                comment_column,
                first_data_row,
            },
        }),
        Commands::Eic {
            features,
            spectra_dir,
            output,
            mz_tolerance,
            zoom_window,
            mz_column,
            rt_column,
            id_column,
            first_data_row,
        } => eic::run(
            features,
            spectra_dir,
            output,
            lipidflow::eic::EicSettings {
                mz_tolerance,
                zoom_window,
            },
            lipidflow::config::FeatureColumns {
                mz_column,
                rt_column,
                comment_column: id_column,
                first_data_row,
            },
        ),
        Commands::Inspect { file } => inspect::run(file),
    }
}
