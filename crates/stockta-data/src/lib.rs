//! Bar ingestion and indicator record persistence.
//!
//! Sources turn files and broker payloads into
//! [`Bar`](stockta_core::types::Bar)s; sinks implement
//! [`RecordSink`](stockta_core::traits::RecordSink) with full-replace
//! semantics per instrument.

mod candles;
mod csv_sink;
mod csv_source;
mod jsonl_sink;
mod memory_sink;
mod timestamp;

pub use candles::parse_candles;
pub use csv_sink::CsvSink;
pub use csv_source::CsvDataSource;
pub use jsonl_sink::JsonLinesSink;
pub use memory_sink::{MemorySink, StoredSeries};

use chrono::{DateTime, SecondsFormat};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use stockta_core::error::StocktaResult;
use stockta_core::types::{BarSeries, Timeframe};

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Load one instrument's bars and validate them into a series.
///
/// `.json` files are read as broker candle payloads, anything else as CSV.
pub fn load_series(
    path: impl AsRef<Path>,
    symbol: &str,
    timeframe: Timeframe,
) -> StocktaResult<BarSeries> {
    let path = path.as_ref();
    let bars = if is_candle_payload(path) {
        parse_candles(&std::fs::read_to_string(path)?)?
    } else {
        CsvDataSource::new(path)?.load()?
    };
    Ok(BarSeries::new(symbol, timeframe, bars)?)
}

/// Whether `path` names a broker candle payload.
fn is_candle_payload(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Staging file beside `target`, unique to this write.
pub(crate) fn staging_path(target: &Path) -> PathBuf {
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}-{}.partial", name, std::process::id(), seq))
}

/// RFC 3339 in UTC with millisecond precision.
pub(crate) fn format_timestamp(ts: i64) -> String {
    DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ts.to_string())
}

/// Make a symbol safe to use as a file name.
pub(crate) fn file_stem_for(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockta_core::error::StocktaError;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1_705_312_800_000), "2024-01-15T10:00:00.000Z");
    }

    #[test]
    fn test_staging_paths_are_unique() {
        let target = Path::new("/out/TCS.csv");
        let first = staging_path(target);
        let second = staging_path(target);

        assert_ne!(first, second);
        assert_eq!(first.parent(), target.parent());
        assert!(first.to_string_lossy().ends_with(".partial"));
    }

    #[test]
    fn test_load_series_by_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let csv = dir.path().join("TCS.csv");
        let json = dir.path().join("INFY.json");
        std::fs::write(&csv, "timestamp,open,high,low,close,volume\n2024-01-15,1,2,0.5,1.5,10\n").unwrap();
        std::fs::write(&json, "[[1705290300, 1, 2, 0.5, 1.5, 10], [1705290360, 1, 2, 0.5, 1.5, 10]]")
            .unwrap();

        assert_eq!(load_series(&csv, "TCS", Timeframe::Minute1).unwrap().len(), 1);
        let series = load_series(&json, "INFY", Timeframe::Minute1).unwrap();
        assert_eq!(series.symbol(), "INFY");
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_load_series_reports_invalid_series() {
        let dir = tempfile::TempDir::new().unwrap();
        let json = dir.path().join("DUP.json");
        std::fs::write(&json, "[[1705290300, 1, 2, 0.5, 1.5, 10], [1705290300, 1, 2, 0.5, 1.5, 10]]")
            .unwrap();

        let err = load_series(&json, "DUP", Timeframe::Minute1).unwrap_err();
        assert!(matches!(err, StocktaError::Series(_)));
    }

    #[test]
    fn test_file_stem_for() {
        assert_eq!(file_stem_for("M&M"), "M_M");
        assert_eq!(file_stem_for("NIFTY 50"), "NIFTY_50");
        assert_eq!(file_stem_for("INFY-EQ"), "INFY-EQ");
    }
}
