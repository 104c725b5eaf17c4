//! CLI argument parsing using clap.
//!
//! This module defines the command-line interface for pairpioneer,
//! including all subcommands and their arguments.

mod config;

pub use config::{AnalysisArgs, PaperArgs};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pairpioneer - cointegration pair selection and z-score signals
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,

    /// JSON config file; flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test one pair for cointegration and report its hedge ratio
    Evaluate {
        /// Independent leg (x)
        #[arg(long)]
        x: String,
        /// Dependent leg (y)
        #[arg(long)]
        y: String,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Generate entry/exit signals for one pair
    Signals {
        /// Independent leg (x)
        #[arg(long)]
        x: String,
        /// Dependent leg (y)
        #[arg(long)]
        y: String,
        /// Hedge ratio; estimated from the data when omitted
        #[arg(long)]
        beta: Option<f64>,
        /// Close an open position at the last row
        #[arg(long, default_value_t = false)]
        close: bool,
        /// Write the signal list here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        analysis: AnalysisArgs,
        #[command(flatten)]
        paper: PaperArgs,
    },

    /// Test every pair in a symbol list
    Discover {
        /// Comma-separated symbols (e.g., "KO,PEP,XOM")
        #[arg(long)]
        symbols: String,
        /// Write the accepted pairs here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
}
