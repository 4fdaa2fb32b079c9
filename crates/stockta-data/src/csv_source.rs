//! CSV bar source.

use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stockta_core::error::DataError;
use stockta_core::types::Bar;

use crate::timestamp::parse_timestamp;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "Timestamp", alias = "time")]
    timestamp: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume")]
    volume: String,
}

/// CSV data source for historical bars.
///
/// Rows are returned in file order. Ordering problems are reported by
/// `BarSeries::new`, never silently fixed here.
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    /// Create a new CSV data source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Load every bar in the file.
    pub fn load(&self) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::Parse {
                record: 0,
                message: e.to_string(),
            })?;

        let mut bars = Vec::new();

        for (index, result) in reader.deserialize().enumerate() {
            let record: CsvRecord = result.map_err(|e| DataError::Parse {
                record: index,
                message: e.to_string(),
            })?;

            let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| DataError::Parse {
                record: index,
                message: format!("Could not parse timestamp: {}", record.timestamp),
            })?;
            let volume = parse_volume(&record.volume).map_err(|message| DataError::Parse {
                record: index,
                message,
            })?;

            bars.push(Bar::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                volume,
            ));
        }

        if bars.is_empty() {
            return Err(DataError::NoDataAvailable(self.path.display().to_string()));
        }

        Ok(bars)
    }
}

/// Volumes are whole shares. `"1200"` and `"1200.0"` are accepted; a
/// fractional, negative or out-of-range volume is rejected.
pub(crate) fn parse_volume(raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 => {
            Ok(v as u64)
        }
        Ok(v) => Err(format!("Volume must be a non-negative whole number, got {}", v)),
        Err(_) => Err(format!("Could not parse volume: {}", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_keeps_file_order() {
        let file = write_csv(
            "timestamp,open,high,low,close,volume\n\
             2024-01-15T09:16:00+05:30,10,11,9,10.5,100\n\
             2024-01-15T09:15:00+05:30,10,11,9,10.5,200\n",
        );
        let bars = CsvDataSource::new(file.path()).unwrap().load().unwrap();

        assert_eq!(bars.len(), 2);
        assert!(bars[0].timestamp > bars[1].timestamp);
        assert_eq!(bars[1].volume, 200);
    }

    #[test]
    fn test_capitalized_headers() {
        let file = write_csv("Date,Open,High,Low,Close,Volume\n2024-01-15,1,2,0.5,1.5,10\n");
        let bars = CsvDataSource::new(file.path()).unwrap().load().unwrap();

        assert_eq!(bars[0].timestamp, 1_705_276_800_000);
        assert_eq!(bars[0].close, 1.5);
    }

    #[test]
    fn test_fractional_volume_is_rejected() {
        let file = write_csv(
            "timestamp,open,high,low,close,volume\n\
             2024-01-15,1,2,0.5,1.5,10\n\
             2024-01-16,1,2,0.5,1.5,10.5\n",
        );
        let err = CsvDataSource::new(file.path()).unwrap().load().unwrap_err();

        assert!(matches!(err, DataError::Parse { record: 1, .. }));
    }

    #[test]
    fn test_bad_timestamp_reports_record() {
        let file = write_csv("timestamp,open,high,low,close,volume\nsoon,1,2,0.5,1.5,10\n");
        let err = CsvDataSource::new(file.path()).unwrap().load().unwrap_err();

        assert!(matches!(err, DataError::Parse { record: 0, .. }));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvDataSource::new("/definitely/not/here.csv"),
            Err(DataError::NoDataAvailable(_))
        ));
    }

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume("1200"), Ok(1200));
        assert_eq!(parse_volume("1200.0"), Ok(1200));
        assert!(parse_volume("-5").is_err());
        assert!(parse_volume("abc").is_err());
    }

    #[test]
    fn test_volume_past_u64_is_rejected() {
        // 2^64 as a float would saturate to u64::MAX on cast
        assert!(parse_volume("18446744073709551616.0").is_err());
        assert!(parse_volume("1e20").is_err());
        assert_eq!(parse_volume("18446744073709551615"), Ok(u64::MAX));
    }
}
