//! Error types for indicator computation.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum StocktaError {
    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bar series construction errors.
///
/// These are the only failures the engine surfaces; the caller is expected
/// to skip or re-fetch the offending batch. Every variant names the bar
/// index where validation stopped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Duplicate timestamp {timestamp} at bar {index}")]
    DuplicateTimestamp { index: usize, timestamp: i64 },

    #[error("Timestamp {timestamp} at bar {index} is earlier than previous {previous}")]
    OutOfOrder {
        index: usize,
        previous: i64,
        timestamp: i64,
    },

    #[error("Non-finite {field} price {value} at bar {index}")]
    NonFinitePrice {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Non-positive {field} price {value} at bar {index}")]
    NonPositivePrice {
        index: usize,
        field: &'static str,
        value: f64,
    },
}

impl SeriesError {
    /// Index of the bar that failed validation.
    pub fn index(&self) -> usize {
        match self {
            SeriesError::DuplicateTimestamp { index, .. }
            | SeriesError::OutOfOrder { index, .. }
            | SeriesError::NonFinitePrice { index, .. }
            | SeriesError::NonPositivePrice { index, .. } => *index,
        }
    }
}

/// Ingestion boundary errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("No data available: {0}")]
    NoDataAvailable(String),

    #[error("Parse error at record {record}: {message}")]
    Parse { record: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence adapter errors.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Length mismatch: {bars} bars but {records} records")]
    LengthMismatch { bars: usize, records: usize },

    #[error("Write failed: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type StocktaResult<T> = Result<T, StocktaError>;
