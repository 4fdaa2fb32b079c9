//! OHLCV (Open, High, Low, Close, Volume) data types.

use serde::{Deserialize, Serialize};

use super::Timeframe;
use crate::error::SeriesError;

/// One OHLCV observation.
///
/// Prices are kept as `f64` for fast indicator math. Volume is an unsigned
/// integer so that cumulative volume sums never lose precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: u64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calculate the typical price (HLC average).
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    fn check_prices(&self, index: usize) -> Result<(), SeriesError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() {
                return Err(SeriesError::NonFinitePrice { index, field, value });
            }
            if value <= 0.0 {
                return Err(SeriesError::NonPositivePrice { index, field, value });
            }
        }
        Ok(())
    }
}

/// Ordered, validated bars for exactly one instrument.
///
/// Built once per computation pass and immutable afterwards. Column vectors
/// are extracted at construction so indicators borrow slices instead of
/// re-collecting them.
#[derive(Debug, Clone)]
pub struct BarSeries {
    symbol: String,
    timeframe: Timeframe,
    bars: Vec<Bar>,
    highs: Vec<f64>,
    lows: Vec<f64>,
    closes: Vec<f64>,
    volumes: Vec<u64>,
    typical_prices: Vec<f64>,
}

impl BarSeries {
    /// Validate and build a series.
    ///
    /// Timestamps must be strictly increasing and every price positive and
    /// finite. Bars are never reordered; an out-of-order bar is an error.
    /// The `low <= open, close <= high` relation is not checked.
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: Vec<Bar>,
    ) -> Result<Self, SeriesError> {
        let mut prev: Option<i64> = None;
        for (index, bar) in bars.iter().enumerate() {
            if let Some(previous) = prev {
                if bar.timestamp == previous {
                    return Err(SeriesError::DuplicateTimestamp {
                        index,
                        timestamp: bar.timestamp,
                    });
                }
                if bar.timestamp < previous {
                    return Err(SeriesError::OutOfOrder {
                        index,
                        previous,
                        timestamp: bar.timestamp,
                    });
                }
            }
            bar.check_prices(index)?;
            prev = Some(bar.timestamp);
        }

        Ok(Self {
            symbol: symbol.into(),
            timeframe,
            highs: bars.iter().map(|b| b.high).collect(),
            lows: bars.iter().map(|b| b.low).collect(),
            closes: bars.iter().map(|b| b.close).collect(),
            volumes: bars.iter().map(|b| b.volume).collect(),
            typical_prices: bars.iter().map(Bar::typical_price).collect(),
            bars,
        })
    }

    /// Instrument identifier.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Nominal bar spacing.
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars in series order.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn highs(&self) -> &[f64] {
        &self.highs
    }

    pub fn lows(&self) -> &[f64] {
        &self.lows
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn volumes(&self) -> &[u64] {
        &self.volumes
    }

    /// Typical prices, `(high + low + close) / 3` per bar.
    pub fn typical_prices(&self) -> &[f64] {
        &self.typical_prices
    }

    /// Timestamps in series order.
    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.bars.iter().map(|b| b.timestamp)
    }

    /// Count the intervals between consecutive bars that are longer than the
    /// series timeframe. Gaps are tolerated; indicators are bar-indexed.
    pub fn gaps(&self) -> usize {
        let step = self.timeframe.as_millis();
        self.bars
            .windows(2)
            .filter(|w| w[1].timestamp - w[0].timestamp > step)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar::new(ts, close, close + 1.0, close - 1.0, close, 1_000)
    }

    #[test]
    fn test_bar_calculations() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1_000_000);

        assert!((bar.typical_price() - 103.333333).abs() < 0.001);
    }

    #[test]
    fn test_series_columns() {
        let series = BarSeries::new(
            "WIPRO",
            Timeframe::Minute1,
            vec![bar(60_000, 100.5), bar(120_000, 101.5)],
        )
        .unwrap();

        assert_eq!(series.symbol(), "WIPRO");
        assert_eq!(series.closes(), &[100.5, 101.5]);
        assert_eq!(series.volumes(), &[1_000, 1_000]);
        assert_eq!(series.highs(), &[101.5, 102.5]);
        assert!((series.typical_prices()[0] - 100.5).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let err = BarSeries::new(
            "WIPRO",
            Timeframe::Minute1,
            vec![bar(60_000, 100.0), bar(60_000, 101.0)],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SeriesError::DuplicateTimestamp { index: 1, timestamp: 60_000 }
        ));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let err = BarSeries::new(
            "WIPRO",
            Timeframe::Minute1,
            vec![bar(120_000, 100.0), bar(60_000, 101.0)],
        )
        .unwrap_err();

        assert!(matches!(err, SeriesError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn test_non_finite_price_rejected() {
        let mut bad = bar(60_000, 100.0);
        bad.high = f64::NAN;
        let err = BarSeries::new("WIPRO", Timeframe::Minute1, vec![bad]).unwrap_err();

        assert!(matches!(
            err,
            SeriesError::NonFinitePrice { index: 0, field: "high", .. }
        ));
    }

    #[test]
    fn test_inverted_range_is_accepted() {
        // high < low is upstream noise, not a construction failure
        let odd = Bar::new(60_000, 100.0, 99.0, 101.0, 100.0, 10);
        assert!(BarSeries::new("WIPRO", Timeframe::Minute1, vec![odd]).is_ok());
    }

    #[test]
    fn test_gap_count() {
        let series = BarSeries::new(
            "WIPRO",
            Timeframe::Minute1,
            vec![bar(0, 1.0), bar(60_000, 1.0), bar(300_000, 1.0), bar(360_000, 1.0)],
        )
        .unwrap();

        assert_eq!(series.gaps(), 1);
    }
}
