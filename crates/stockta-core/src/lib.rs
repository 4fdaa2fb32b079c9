//! Core types and traits for indicator computation.
//!
//! This crate provides the foundational building blocks:
//! - Market data types (Bar, BarSeries, Timeframe)
//! - Per-bar indicator output (IndicatorRecord, AlignedSeries)
//! - Traits for recurrences, bar indicators and persistence sinks

pub mod error;
pub mod traits;
pub mod types;

pub use error::{DataError, SeriesError, SinkError, StocktaError, StocktaResult};
pub use traits::*;
pub use types::*;
