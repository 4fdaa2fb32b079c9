//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, EngineConfig, IngestConfig, LoggingConfig, OutputConfig,
    OutputFormat, VwapKind,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix; `STOCKTA__ENGINE__VWAP=rolling` overrides
/// `[engine] vwap`.
pub const ENV_PREFIX: &str = "STOCKTA";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from file and environment.
///
/// Without a path only defaults and environment overrides apply. With
/// `required` a missing file is an error.
pub fn load_config(path: Option<&Path>, required: bool) -> Result<AppConfig, SettingsError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(required));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    app.validate()?;
    Ok(app)
}
