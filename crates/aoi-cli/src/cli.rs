//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// AOI run aggregation for gaze metrics.
///
/// Merges short, time-contiguous, same-AOI gaze samples into runs and writes
/// per-worksheet result tables.
#[derive(Debug, Parser)]
#[command(name = "aoi", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Aggregate every worksheet in the input directory.
    Process {
        /// Directory of input worksheets (overrides config).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Directory for result tables (overrides config).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print per-AOI totals for a single worksheet.
    Report {
        /// The worksheet to aggregate.
        file: PathBuf,

        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}
