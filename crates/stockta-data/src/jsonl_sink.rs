//! JSON-lines persistence adapter.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use stockta_core::error::SinkError;
use stockta_core::traits::{check_lengths, RecordSink};
use stockta_core::types::{Bar, BarSeries, IndicatorRecord};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{file_stem_for, format_timestamp, staging_path};

/// One output line: the bar plus its defined indicators.
#[derive(Serialize)]
struct JsonRow<'a> {
    symbol: &'a str,
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    #[serde(flatten)]
    indicators: &'a IndicatorRecord,
}

impl<'a> JsonRow<'a> {
    fn new(symbol: &'a str, bar: &Bar, indicators: &'a IndicatorRecord) -> Self {
        Self {
            symbol,
            time: format_timestamp(bar.timestamp),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            indicators,
        }
    }
}

/// Writes one `.jsonl` file per instrument; absent indicators are omitted.
pub struct JsonLinesSink {
    directory: PathBuf,
    batch_size: usize,
}

impl JsonLinesSink {
    pub fn new(directory: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            directory: directory.into(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.directory.join(format!("{}.jsonl", file_stem_for(symbol)))
    }

    async fn write_file(
        &self,
        path: &Path,
        series: &BarSeries,
        records: &[IndicatorRecord],
    ) -> Result<usize, SinkError> {
        let mut file = fs::File::create(path).await?;
        let mut written = 0;

        let batches = series
            .bars()
            .chunks(self.batch_size)
            .zip(records.chunks(self.batch_size));
        for (bars, batch) in batches {
            let mut buffer = Vec::new();
            for (bar, record) in bars.iter().zip(batch) {
                serde_json::to_writer(&mut buffer, &JsonRow::new(series.symbol(), bar, record))
                    .map_err(|e| SinkError::Write(e.to_string()))?;
                buffer.push(b'\n');
            }
            file.write_all(&buffer).await?;
            written += batch.len();
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn replace_series(
        &self,
        series: &BarSeries,
        records: &[IndicatorRecord],
    ) -> Result<usize, SinkError> {
        check_lengths(series, records)?;
        fs::create_dir_all(&self.directory).await?;

        let target = self.path_for(series.symbol());
        let staging = staging_path(&target);

        let written = match self.write_file(&staging, series, records).await {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&staging).await;
                return Err(e);
            }
        };
        fs::rename(&staging, &target).await?;

        debug!("Wrote {} lines to {:?}", written, target);
        Ok(written)
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}
