use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use aoi_cli::commands::{process, report};
use aoi_cli::{Cli, Commands, Config};

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

    match &cli.command {
        Some(Commands::Process { input, output }) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            tracing::debug!(?config, "loaded configuration");
            process::run(&config, input.as_deref(), output.as_deref())?;
        }
        Some(Commands::Report { file, json }) => {
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            report::run(&config, file, *json)?;
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
