//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use stockta_config::AppConfig;

pub async fn run(config_path: &Path, config: &AppConfig) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);
    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("VWAP: {:?}", config.engine.to_engine_settings().vwap);
    println!("Bollinger dispersion: {:?}", config.engine.bollinger_dispersion);
    println!("Output: {:?} -> {}", config.output.format, config.output.directory.display());
    println!();
    println!("Effective configuration:");
    println!("{}", config.to_toml()?);

    Ok(())
}
