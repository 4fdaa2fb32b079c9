//! Per-run coverage and timing summary.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use stockta_core::types::{Field, IndicatorRecord};
use stockta_indicators::IndicatorEngine;
use tracing::{info, warn};

/// Defined-value count for one indicator field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldCoverage {
    pub field: &'static str,
    pub defined: usize,
    /// Bars from the field's first index on.
    pub expected: usize,
}

impl FieldCoverage {
    /// Values dropped after warm-up (non-finite results).
    pub fn missing(&self) -> usize {
        self.expected.saturating_sub(self.defined)
    }
}

/// Outcome of one instrument's recompute.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentSummary {
    pub symbol: String,
    pub bars: usize,
    pub gaps: usize,
    pub rows_written: usize,
    pub elapsed_ms: u128,
    pub coverage: Vec<FieldCoverage>,
}

impl InstrumentSummary {
    pub fn new(
        engine: &IndicatorEngine,
        symbol: impl Into<String>,
        records: &[IndicatorRecord],
        gaps: usize,
        rows_written: usize,
        elapsed: Duration,
    ) -> Self {
        let bars = records.len();
        let coverage = Field::ALL
            .iter()
            .map(|&field| FieldCoverage {
                field: field.name(),
                defined: records.iter().filter(|r| r.is_defined(field)).count(),
                expected: bars.saturating_sub(engine.first_index(field)),
            })
            .collect();

        Self {
            symbol: symbol.into(),
            bars,
            gaps,
            rows_written,
            elapsed_ms: elapsed.as_millis(),
            coverage,
        }
    }

    /// Fields with fewer values than their warm-up allows.
    pub fn incomplete(&self) -> impl Iterator<Item = &FieldCoverage> {
        self.coverage.iter().filter(|c| c.missing() > 0)
    }

    /// Emit the summary through `tracing`.
    pub fn log(&self) {
        info!(
            "{}: {} bars, {} rows written in {} ms",
            self.symbol, self.bars, self.rows_written, self.elapsed_ms
        );
        for c in self.incomplete() {
            warn!(
                "{}: {} has {} of {} expected values",
                self.symbol, c.field, c.defined, c.expected
            );
        }
    }
}

impl fmt::Display for InstrumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} | {} bars | {} gaps | {} rows | {} ms",
            self.symbol, self.bars, self.gaps, self.rows_written, self.elapsed_ms
        )?;
        writeln!(f, "  {:<14} {:>10} {:>10}", "indicator", "defined", "expected")?;
        for c in &self.coverage {
            writeln!(f, "  {:<14} {:>10} {:>10}", c.field, c.defined, c.expected)?;
        }
        Ok(())
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub instruments: Vec<InstrumentSummary>,
    pub failures: Vec<Failure>,
}

/// An instrument that was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub source: String,
    pub error: String,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, summary: InstrumentSummary) {
        self.instruments.push(summary);
    }

    pub fn record_failure(&mut self, source: impl Into<String>, error: impl fmt::Display) {
        self.failures.push(Failure {
            source: source.into(),
            error: error.to_string(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn total_bars(&self) -> usize {
        self.instruments.iter().map(|s| s.bars).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for summary in &self.instruments {
            write!(f, "{}", summary)?;
        }
        writeln!(
            f,
            "{} instruments, {} bars, {} failed",
            self.instruments.len(),
            self.total_bars(),
            self.failures.len()
        )?;
        for failure in &self.failures {
            writeln!(f, "  FAILED {}: {}", failure.source, failure.error)?;
        }
        Ok(())
    }
}
