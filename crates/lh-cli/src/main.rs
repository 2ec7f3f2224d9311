use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lh_cli::commands::{extract, query, serve, status};
use lh_cli::{Cli, Commands, Config};
use lh_core::QueryKind;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match &cli.command {
        Some(Commands::Serve { listen }) => {
            serve::run(&config, listen.as_deref())?;
        }
        Some(Commands::Extract) => {
            extract::run(&config)?;
        }
        Some(Commands::Status) => {
            status::run(&config)?;
        }
        Some(Commands::Places { filter }) => {
            query::run(&config, QueryKind::Places, filter)?;
        }
        Some(Commands::ActivityTypes { filter }) => {
            query::run(&config, QueryKind::ActivityTypes, filter)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
