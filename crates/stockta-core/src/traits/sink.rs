//! Persistence adapter trait.

use async_trait::async_trait;

use crate::error::SinkError;
use crate::types::{BarSeries, IndicatorRecord};

/// Destination for computed indicator records.
///
/// The engine always emits the full series, so a sink replaces whatever it
/// held for the instrument (last writer wins). Rows are keyed by
/// `(symbol, timestamp)`.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Replace the stored rows for `series.symbol()`.
    ///
    /// `records` must correspond 1:1 with the series bars. Returns the
    /// number of rows written.
    async fn replace_series(
        &self,
        series: &BarSeries,
        records: &[IndicatorRecord],
    ) -> Result<usize, SinkError>;

    /// Get the sink name.
    fn name(&self) -> &str;
}

/// Reject record slices that do not line up with their bars.
pub fn check_lengths(series: &BarSeries, records: &[IndicatorRecord]) -> Result<(), SinkError> {
    if series.len() != records.len() {
        return Err(SinkError::LengthMismatch {
            bars: series.len(),
            records: records.len(),
        });
    }
    Ok(())
}
