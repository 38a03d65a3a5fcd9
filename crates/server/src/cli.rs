use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Data shift monitor for inference traffic.
#[derive(Parser, Debug)]
#[command(name = "shiftwatch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server and the periodic check loop (default).
    Serve,
    /// Run a single check, print the report as JSON, exit non-zero on error status.
    Check {
        /// Lookback window in minutes; defaults to LOOKBACK_MINUTES.
        #[arg(long)]
        lookback_minutes: Option<u32>,
    },
    /// Inspect or replace the active baseline.
    Baseline {
        #[command(subcommand)]
        action: BaselineAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum BaselineAction {
    /// Print the active baseline as JSON.
    Show,
    /// Replace the active baseline with the values in a JSON file.
    Set {
        /// File holding avg_text_length, text_length_std, language_distribution, avg_request_volume.
        file: PathBuf,
    },
}
