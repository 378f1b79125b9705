//! Laminar - Dependency-Cache Build Orchestrator
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use laminar::cli::{Cli, Commands};
use laminar::config::ConfigManager;
use laminar::error::LaminarResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> LaminarResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("laminar=warn"),
        1 => EnvFilter::new("laminar=info"),
        _ => EnvFilter::new("laminar=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    match cli.command {
        Commands::Build(args) => laminar::cli::commands::build(args, &config).await,
        Commands::Fingerprint(args) => laminar::cli::commands::fingerprint(args).await,
        Commands::Cache(args) => laminar::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            laminar::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
