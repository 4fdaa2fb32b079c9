//! Volatility indicators.

use serde::{Deserialize, Serialize};
use stockta_core::traits::{BarIndicator, Recurrence};
use stockta_core::types::{AlignedSeries, BarSeries};

use crate::moving_average::{sma, wilder};
use crate::rolling::{rolling_std_dev_with, Dispersion};

/// True range per bar, starting at bar 1 (bar 0 has no previous close).
///
/// `max(high - low, |high - prev_close|, |low - prev_close|)`
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let len = high.len().min(low.len()).min(close.len());
    if len < 2 {
        return vec![];
    }

    (1..len)
        .map(|i| {
            let high_low = high[i] - low[i];
            let high_close = (high[i] - close[i - 1]).abs();
            let low_close = (low[i] - close[i - 1]).abs();
            high_low.max(high_close).max(low_close)
        })
        .collect()
}

/// Average True Range (ATR).
///
/// Wilder-smoothed true range. Defined from bar `period`.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Calculate ATR from OHLC data.
    pub fn calculate_ohlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        wilder(&true_range(high, low, close), self.period)
    }
}

impl Default for Atr {
    fn default() -> Self {
        Self::new(14)
    }
}

impl BarIndicator for Atr {
    type Output = f64;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<f64> {
        let values = self.calculate_ohlc(series.highs(), series.lows(), series.closes());
        AlignedSeries::new(self.first_index(), values)
    }

    fn first_index(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Upper band
    pub upper: f64,
    /// Middle band (SMA)
    pub middle: f64,
    /// Lower band
    pub lower: f64,
}

/// Bollinger Bands.
///
/// Consists of a middle band (SMA) with upper and lower bands
/// at a specified number of standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
    dispersion: Dispersion,
}

impl BollingerBands {
    /// Create new Bollinger Bands with default parameters (20, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    /// Create Bollinger Bands with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(
            std_dev_multiplier > 0.0,
            "Std dev multiplier must be positive"
        );
        Self {
            period,
            std_dev_multiplier,
            dispersion: Dispersion::Sample,
        }
    }

    /// Choose the standard deviation divisor.
    pub fn with_dispersion(mut self, dispersion: Dispersion) -> Self {
        self.dispersion = dispersion;
        self
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl Recurrence for BollingerBands {
    type Output = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> Vec<BollingerOutput> {
        let middles = sma(data, self.period);
        let deviations = rolling_std_dev_with(data, self.period, self.dispersion);

        middles
            .iter()
            .zip(deviations.iter())
            .map(|(&middle, &std_dev)| {
                let width = self.std_dev_multiplier * std_dev;
                BollingerOutput {
                    upper: middle + width,
                    middle,
                    lower: middle - width,
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}

impl BarIndicator for BollingerBands {
    type Output = BollingerOutput;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<BollingerOutput> {
        self.calculate_aligned(series.closes())
    }

    fn first_index(&self) -> usize {
        self.period - 1
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rolling::rolling_std_dev;

    #[test]
    fn test_true_range_starts_at_second_bar() {
        let high = vec![10.0, 11.0, 12.0];
        let low = vec![8.0, 9.0, 11.5];
        let close = vec![9.0, 10.0, 11.8];

        let tr = true_range(&high, &low, &close);
        assert_eq!(tr.len(), 2);
        assert!((tr[0] - 2.0).abs() < 1e-12);
        // max(0.5, |12 - 10|, |11.5 - 10|) = 2
        assert!((tr[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_atr_ohlc() {
        let atr = Atr::new(3);
        let high = vec![10.0, 11.0, 12.0, 11.0, 13.0, 14.0];
        let low = vec![8.0, 9.0, 10.0, 9.0, 11.0, 12.0];
        let close = vec![9.0, 10.0, 11.0, 10.0, 12.0, 13.0];

        let result = atr.calculate_ohlc(&high, &low, &close);
        // 5 true ranges, Wilder(3) => 3 values, first at bar 3
        assert_eq!(result.len(), 3);

        // All ATR values should be positive
        for value in &result {
            assert!(*value > 0.0);
        }
    }

    #[test]
    fn test_bollinger_bands() {
        let bb = BollingerBands::new();
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.1).sin() * 5.0)
            .collect();

        let result = bb.calculate(&data);
        assert_eq!(result.len(), 11);

        for output in &result {
            // Upper > Middle > Lower
            assert!(output.upper > output.middle);
            assert!(output.middle > output.lower);
        }
    }

    #[test]
    fn test_bollinger_constant_price_collapses() {
        let bb = BollingerBands::with_params(5, 2.0);
        let data = vec![100.0, 100.0, 100.0, 100.0, 100.0];

        let result = bb.calculate(&data);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].upper, result[0].lower);
        assert!((result[0].middle - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_bollinger_dispersion_widens_bands() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sample = BollingerBands::with_params(8, 2.0).calculate(&data);
        let population = BollingerBands::with_params(8, 2.0)
            .with_dispersion(Dispersion::Population)
            .calculate(&data);

        // Population std dev of the window is exactly 2, sample is sqrt(32/7)
        assert!((population[0].upper - (5.0 + 4.0)).abs() < 1e-10);
        let sample_std = (32.0_f64 / 7.0).sqrt();
        assert!((sample[0].upper - (5.0 + 2.0 * sample_std)).abs() < 1e-10);
        assert!(sample[0].upper > population[0].upper);
    }

    #[test]
    fn test_default_bands_use_sample_std_dev() {
        let data: Vec<f64> = (0..20).map(|i| 100.0 + (i % 5) as f64).collect();
        let band = BollingerBands::new().calculate(&data)[0];

        let std = rolling_std_dev(&data, 20)[0];
        assert!((band.upper - (band.middle + 2.0 * std)).abs() < 1e-9);
        assert!((band.upper - 104.9019).abs() < 1e-4);
    }
}
