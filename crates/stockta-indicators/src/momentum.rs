//! Momentum indicators.

use serde::{Deserialize, Serialize};
use stockta_core::traits::{BarIndicator, Recurrence};
use stockta_core::types::{AlignedSeries, BarSeries};

use crate::moving_average::{sma, wilder};
use crate::rolling::{rolling_max, rolling_min};

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Recurrence for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        // Calculate price changes
        let mut gains = Vec::with_capacity(data.len() - 1);
        let mut losses = Vec::with_capacity(data.len() - 1);

        for pair in data.windows(2) {
            let change = pair[1] - pair[0];
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        // Smooth gains and losses
        let avg_gains = wilder(&gains, self.period);
        let avg_losses = wilder(&losses, self.period);

        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(&gain, &loss)| {
                if loss == 0.0 {
                    100.0
                } else {
                    100.0 - (100.0 / (1.0 + gain / loss))
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

impl BarIndicator for Rsi {
    type Output = f64;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<f64> {
        self.calculate_aligned(series.closes())
    }

    fn first_index(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticOutput {
    /// %K (fast stochastic)
    pub k: f64,
    /// %D (SMA of %K)
    pub d: f64,
}

/// Stochastic oscillator.
///
/// Compares closing price to the high-low range over a period. %K and %D
/// are emitted together from the first bar where %D exists.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Stochastic {
    /// Create a new stochastic oscillator with default parameters (14, 3).
    pub fn new() -> Self {
        Self::with_periods(14, 3)
    }

    /// Create with custom periods.
    pub fn with_periods(k_period: usize, d_period: usize) -> Self {
        assert!(k_period > 0 && d_period > 0);
        Self { k_period, d_period }
    }

    /// Calculate stochastic from OHLC columns.
    ///
    /// A zero high-low range gives %K = 0.
    pub fn calculate_ohlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<StochasticOutput> {
        let len = high.len().min(low.len()).min(close.len());
        if len < self.k_period + self.d_period - 1 {
            return vec![];
        }

        let highest = rolling_max(&high[..len], self.k_period);
        let lowest = rolling_min(&low[..len], self.k_period);

        let k_values: Vec<f64> = highest
            .iter()
            .zip(lowest.iter())
            .zip(&close[self.k_period - 1..len])
            .map(|((&hh, &ll), &c)| {
                let range = hh - ll;
                if range == 0.0 {
                    0.0
                } else {
                    ((c - ll) / range) * 100.0
                }
            })
            .collect();

        let d_values = sma(&k_values, self.d_period);

        k_values[self.d_period - 1..]
            .iter()
            .zip(d_values.iter())
            .map(|(&k, &d)| StochasticOutput { k, d })
            .collect()
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new()
    }
}

impl BarIndicator for Stochastic {
    type Output = StochasticOutput;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<StochasticOutput> {
        let values = self.calculate_ohlc(series.highs(), series.lows(), series.closes());
        AlignedSeries::new(self.first_index(), values)
    }

    fn first_index(&self) -> usize {
        self.k_period + self.d_period - 2
    }

    fn name(&self) -> &str {
        "Stochastic"
    }
}

/// Williams %R.
///
/// `-100 * (highest high - close) / (highest high - lowest low)`, in
/// `[-100, 0]` for well-formed bars. A zero range gives 0.
#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    pub fn calculate_ohlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let len = high.len().min(low.len()).min(close.len());
        if len < self.period {
            return vec![];
        }

        let highest = rolling_max(&high[..len], self.period);
        let lowest = rolling_min(&low[..len], self.period);

        highest
            .iter()
            .zip(lowest.iter())
            .zip(&close[self.period - 1..len])
            .map(|((&hh, &ll), &c)| {
                let range = hh - ll;
                if range == 0.0 {
                    0.0
                } else {
                    -100.0 * (hh - c) / range
                }
            })
            .collect()
    }
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self::new(14)
    }
}

impl BarIndicator for WilliamsR {
    type Output = f64;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<f64> {
        let values = self.calculate_ohlc(series.highs(), series.lows(), series.closes());
        AlignedSeries::new(self.first_index(), values)
    }

    fn first_index(&self) -> usize {
        self.period - 1
    }

    fn name(&self) -> &str {
        "Williams %R"
    }
}

/// Rate of Change, in percent against the close `period` bars earlier.
#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Roc {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Recurrence for Roc {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        data[self.period..]
            .iter()
            .zip(data.iter())
            .map(|(&current, &past)| {
                if past == 0.0 {
                    0.0
                } else {
                    100.0 * (current - past) / past
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ROC"
    }
}

impl BarIndicator for Roc {
    type Output = f64;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<f64> {
        self.calculate_aligned(series.closes())
    }

    fn first_index(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "ROC"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_basic() {
        let rsi = Rsi::new(14);
        // Generate test data with alternating up/down moves
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();

        let result = rsi.calculate(&data);
        assert_eq!(result.len(), 30 - 14);

        // All RSI values should be between 0 and 100
        for value in &result {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_all_gains() {
        let rsi = Rsi::new(5);
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let result = rsi.calculate(&data);

        assert!(!result.is_empty());
        // All gains = RSI should be 100
        for value in &result {
            assert!((value - 100.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_rsi_all_losses() {
        let rsi = Rsi::new(5);
        let data = vec![7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let result = rsi.calculate(&data);

        assert!(!result.is_empty());
        // All losses = RSI should be 0
        assert!(result[0].abs() < 1e-10);
    }

    #[test]
    fn test_rsi_needs_period_plus_one() {
        let rsi = Rsi::new(14);
        let data: Vec<f64> = (0..14).map(|i| i as f64 + 1.0).collect();
        assert!(rsi.calculate(&data).is_empty());

        let aligned = rsi.calculate_aligned(&[data, vec![15.0]].concat());
        assert_eq!(aligned.start(), 14);
        assert_eq!(aligned.len(), 1);
    }

    #[test]
    fn test_stochastic_basic() {
        let stoch = Stochastic::new();
        let high: Vec<f64> = (0..30).map(|i| 105.0 + i as f64).collect();
        let low: Vec<f64> = (0..30).map(|i| 95.0 + i as f64).collect();
        let close: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();

        let result = stoch.calculate_ohlc(&high, &low, &close);
        // 30 bars, first defined at 14 + 3 - 2 = 15
        assert_eq!(result.len(), 15);

        // All values should be between 0 and 100
        for output in &result {
            assert!(output.k >= 0.0 && output.k <= 100.0);
            assert!(output.d >= 0.0 && output.d <= 100.0);
        }
    }

    #[test]
    fn test_stochastic_at_high() {
        let stoch = Stochastic::with_periods(5, 3);
        // Close at highs
        let high = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0];
        let low = vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let close = high.clone();

        let result = stoch.calculate_ohlc(&high, &low, &close);
        assert!(!result.is_empty());

        // Close at high = %K should be 100
        assert!((result.last().unwrap().k - 100.0).abs() < 1e-10);
        assert!((result.last().unwrap().d - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_stochastic_flat_range_is_zero() {
        let stoch = Stochastic::with_periods(3, 2);
        let flat = vec![50.0; 6];

        for output in stoch.calculate_ohlc(&flat, &flat, &flat) {
            assert_eq!(output.k, 0.0);
            assert_eq!(output.d, 0.0);
        }
    }

    #[test]
    fn test_williams_r() {
        let wr = WilliamsR::new(3);
        let high = vec![10.0, 12.0, 11.0, 13.0];
        let low = vec![8.0, 9.0, 7.0, 10.0];
        let close = vec![9.0, 11.0, 7.0, 13.0];

        let result = wr.calculate_ohlc(&high, &low, &close);
        assert_eq!(result.len(), 2);
        // hh = 12, ll = 7, close = 7 => -100
        assert!((result[0] + 100.0).abs() < 1e-10);
        // hh = 13, ll = 7, close = 13 => 0
        assert!(result[1].abs() < 1e-10);
    }

    #[test]
    fn test_roc() {
        let roc = Roc::new(2);
        let result = roc.calculate(&[100.0, 50.0, 110.0, 55.0]);

        assert_eq!(result.len(), 2);
        assert!((result[0] - 10.0).abs() < 1e-10);
        assert!((result[1] - 10.0).abs() < 1e-10);
    }
}
