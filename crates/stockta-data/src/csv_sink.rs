//! CSV persistence adapter.

use async_trait::async_trait;
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use stockta_core::error::SinkError;
use stockta_core::traits::{check_lengths, RecordSink};
use stockta_core::types::{Bar, BarSeries, Field, IndicatorRecord};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{file_stem_for, format_timestamp, staging_path};

const BAR_COLUMNS: [&str; 7] = ["symbol", "timestamp", "open", "high", "low", "close", "volume"];

/// Writes one CSV file per instrument.
///
/// The file is written beside its final name and renamed over it, so a
/// reader never sees a half-replaced series. Concurrent replaces of one
/// instrument stage separately; the last rename wins. Absent indicators are empty
/// cells, distinct from `0`.
pub struct CsvSink {
    directory: PathBuf,
    batch_size: usize,
}

impl CsvSink {
    pub fn new(directory: impl Into<PathBuf>, batch_size: usize) -> Self {
        Self {
            directory: directory.into(),
            batch_size: batch_size.max(1),
        }
    }

    /// Path the instrument's rows are written to.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.directory.join(format!("{}.csv", file_stem_for(symbol)))
    }

    fn header() -> Vec<&'static str> {
        BAR_COLUMNS
            .iter()
            .copied()
            .chain(Field::ALL.iter().map(|f| f.name()))
            .collect()
    }

    fn encode_batch(
        symbol: &str,
        bars: &[Bar],
        records: &[IndicatorRecord],
        with_header: bool,
    ) -> Result<Vec<u8>, SinkError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        let csv_err = |e: csv::Error| SinkError::Write(e.to_string());

        if with_header {
            writer.write_record(Self::header()).map_err(csv_err)?;
        }

        for (bar, record) in bars.iter().zip(records) {
            let mut row = vec![
                symbol.to_string(),
                format_timestamp(bar.timestamp),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ];
            row.extend(
                Field::ALL
                    .iter()
                    .map(|&f| record.get(f).map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&row).map_err(csv_err)?;
        }

        writer
            .into_inner()
            .map_err(|e| SinkError::Write(e.to_string()))
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
        for (i, (bars, batch)) in batches.enumerate() {
            let buffer = Self::encode_batch(series.symbol(), bars, batch, i == 0)?;
            file.write_all(&buffer).await?;
            written += batch.len();
        }

        if written == 0 {
            let buffer = Self::encode_batch(series.symbol(), &[], &[], true)?;
            file.write_all(&buffer).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

#[async_trait]
impl RecordSink for CsvSink {
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

        debug!("Wrote {} rows to {:?}", written, target);
        Ok(written)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
