//! Technical indicator computation CLI.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use stockta_config::load_config;
use stockta_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing file only matters when it is the thing being validated
    let required = matches!(cli.command, Commands::ValidateConfig);
    let config = load_config(Some(cli.config.as_path()), required)?;

    // Setup logging
    let log_level = match cli.log_level {
        Some(level) => level.as_str().to_string(),
        None => config.logging.level.clone(),
    };
    let json_logs = cli.json_logs || config.logging.is_json();
    if let Err(e) = setup_logging(&log_level, json_logs) {
        eprintln!("Logging already initialized: {}", e);
    }

    // Execute command
    match cli.command {
        Commands::Compute(args) => cli::commands::compute::run(args, &config).await,
        Commands::Catalog => cli::commands::catalog::run(&config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config, &config).await,
    }
}
