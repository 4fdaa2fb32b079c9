//! Configuration structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stockta_core::types::Timeframe;
use stockta_indicators::{Dispersion, EngineSettings, VwapMode};

use crate::SettingsError;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl AppConfig {
    /// Reject values that deserialize but cannot run.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.engine.vwap == VwapKind::Rolling && self.engine.vwap_window == 0 {
            return Err(SettingsError::Invalid(
                "engine.vwap_window must be at least 1 for rolling VWAP".to_string(),
            ));
        }
        if !(-720..=840).contains(&self.engine.session_utc_offset_minutes) {
            return Err(SettingsError::Invalid(format!(
                "engine.session_utc_offset_minutes {} is outside -720..=840",
                self.engine.session_utc_offset_minutes
            )));
        }
        if self.output.batch_size == 0 {
            return Err(SettingsError::Invalid(
                "output.batch_size must be at least 1".to_string(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(SettingsError::Invalid(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Invalid(e.to_string()))
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "stockta".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// VWAP accumulation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VwapKind {
    #[default]
    Session,
    Rolling,
    Close,
}

/// Indicator semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub vwap: VwapKind,
    pub vwap_window: usize,
    pub session_utc_offset_minutes: i32,
    pub bollinger_dispersion: Dispersion,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vwap: VwapKind::Session,
            vwap_window: 14,
            session_utc_offset_minutes: 330,
            bollinger_dispersion: Dispersion::Sample,
        }
    }
}

impl EngineConfig {
    pub fn to_engine_settings(&self) -> EngineSettings {
        let vwap = match self.vwap {
            VwapKind::Session => VwapMode::Session {
                utc_offset_minutes: self.session_utc_offset_minutes,
            },
            VwapKind::Rolling => VwapMode::Rolling {
                window: self.vwap_window,
            },
            VwapKind::Close => VwapMode::Close,
        };
        EngineSettings {
            vwap,
            bollinger_dispersion: self.bollinger_dispersion,
        }
    }
}

/// Sink selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Jsonl,
}

/// Where computed records go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub directory: PathBuf,
    pub batch_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            directory: PathBuf::from("output"),
            batch_size: 1000,
        }
    }
}

/// Input handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub timeframe: Timeframe,
    /// Log a warning when a series has intervals longer than its timeframe.
    pub gap_warning: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Minute1,
            gap_warning: true,
        }
    }
}
