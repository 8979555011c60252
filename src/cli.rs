use clap::Parser;
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool, // --quiet
    pub debug: bool, // --debug
}

#[derive(Parser)]
#[command(name = "gpxm")]
#[command(about = "Merge multi-device GPX/TCX recordings into one time-ordered GPX track")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Input directory with GPX/TCX files to merge
    pub input_dir: PathBuf,

    /// Output GPX merged file
    pub output_file: PathBuf,

    /// Interpolate heart-rate samples recorded as zero
    #[arg(long)]
    pub filter_zeros: bool,

    /// Log level to DEBUG
    #[arg(long)]
    pub debug: bool,

    /// Suppress per-file console output
    #[arg(long)]
    pub quiet: bool,
}
