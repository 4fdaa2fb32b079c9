//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stockta_config::OutputFormat;
use stockta_core::types::Timeframe;

#[derive(Parser)]
#[command(name = "stockta")]
#[command(author, version, about = "Technical indicators for minute-resolution equity candles")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "STOCKTA_CONFIG", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute indicators for one or more instruments
    Compute(ComputeArgs),
    /// List indicator fields with their first defined bar
    Catalog,
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Jsonl,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Jsonl => OutputFormat::Jsonl,
        }
    }
}

#[derive(clap::Args)]
pub struct ComputeArgs {
    /// Input files or directories (CSV bars or JSON candle payloads)
    #[arg(short, long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Instrument symbol (single input file only; defaults to the file stem)
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Output format
    #[arg(short, long)]
    pub format: Option<FormatArg>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bar timeframe (1m, 5m, one_minute, ...)
    #[arg(short, long, value_parser = parse_timeframe)]
    pub timeframe: Option<Timeframe>,

    /// Do not print the run summary
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_timeframe(raw: &str) -> Result<Timeframe, String> {
    raw.parse::<Timeframe>().map_err(|e| e.to_string())
}
