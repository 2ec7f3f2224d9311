//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Location-history analyzer.
///
/// Ingests daily location export files and answers filtered analytical
/// queries over them, either one-shot on the command line or through the
/// HTTP API.
#[derive(Debug, Parser)]
#[command(name = "lh", version, about, long_about = None)]
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
    /// Start the HTTP API server.
    Serve {
        /// Listen address, e.g. 127.0.0.1:3000 (overrides the config file).
        #[arg(long)]
        listen: Option<String>,
    },

    /// Promote raw export files into the extracted layer.
    Extract,

    /// Load the extracted layer and print counts.
    Status,

    /// List visited places.
    Places {
        /// Filter clauses as KEY=VALUE pairs (e.g. --filter weekday=Sa,Su).
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filter: Vec<String>,
    },

    /// List activity types.
    ActivityTypes {
        /// Filter clauses as KEY=VALUE pairs (e.g. --filter from=2019-01-01).
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filter: Vec<String>,
    },
}
