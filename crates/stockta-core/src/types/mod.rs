//! Core data types.

mod aligned;
mod ohlcv;
mod record;
mod timeframe;

pub use aligned::AlignedSeries;
pub use ohlcv::{Bar, BarSeries};
pub use record::{Family, Field, IndicatorRecord, Value};
pub use timeframe::Timeframe;
