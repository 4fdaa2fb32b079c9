//! In-memory persistence adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use stockta_core::error::SinkError;
use stockta_core::traits::{check_lengths, RecordSink};
use stockta_core::types::{Bar, BarSeries, IndicatorRecord};
use tokio::sync::RwLock;

/// Bars and records stored for one instrument.
#[derive(Debug, Clone)]
pub struct StoredSeries {
    pub bars: Vec<Bar>,
    pub records: Vec<IndicatorRecord>,
}

/// Keeps the latest series per instrument in process memory.
#[derive(Default)]
pub struct MemorySink {
    store: RwLock<HashMap<String, StoredSeries>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored series for a symbol.
    pub async fn get(&self, symbol: &str) -> Option<StoredSeries> {
        self.store.read().await.get(symbol).cloned()
    }

    /// Stored symbols, sorted.
    pub async fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.store.read().await.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Drop a symbol's rows.
    pub async fn clear(&self, symbol: &str) {
        self.store.write().await.remove(symbol);
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn replace_series(
        &self,
        series: &BarSeries,
        records: &[IndicatorRecord],
    ) -> Result<usize, SinkError> {
        check_lengths(series, records)?;

        let stored = StoredSeries {
            bars: series.bars().to_vec(),
            records: records.to_vec(),
        };
        self.store
            .write()
            .await
            .insert(series.symbol().to_string(), stored);

        Ok(records.len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
