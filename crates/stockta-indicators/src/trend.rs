//! Trend indicators: MACD, ADX with directional indicators, and CCI.

use serde::{Deserialize, Serialize};
use stockta_core::traits::{BarIndicator, Recurrence};
use stockta_core::types::{AlignedSeries, BarSeries};

use crate::moving_average::{ema, sma, wilder};
use crate::rolling::rolling_mean_abs_dev;
use crate::volatility::true_range;

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum. The slow EMA
/// starts `slow - fast` bars after the fast one, so the fast EMA is trimmed
/// to the slow EMA's first bar before subtracting; the signal EMA then
/// pushes the first complete output to bar `slow + signal - 2`.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl Recurrence for Macd {
    type Output = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<MacdOutput> {
        if data.len() < self.period() {
            return vec![];
        }

        let fast_ema = ema(data, self.fast_period);
        let slow_ema = ema(data, self.slow_period);

        // Align the EMAs (fast has more values)
        let offset = self.slow_period - self.fast_period;
        let macd_line: Vec<f64> = fast_ema[offset..]
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = ema(&macd_line, self.signal_period);

        macd_line[self.signal_period - 1..]
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

impl BarIndicator for Macd {
    type Output = MacdOutput;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<MacdOutput> {
        self.calculate_aligned(series.closes())
    }

    fn first_index(&self) -> usize {
        self.slow_period + self.signal_period - 2
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// ADX output with the directional indicators it is built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxOutput {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Average Directional Index.
///
/// +DM/-DM and true range are Wilder-smoothed into +DI/-DI; DX is then
/// Wilder-smoothed again into ADX, so the first value lands on bar
/// `2 * period - 1`. Zero ATR gives zero DI; zero DI sum gives zero DX.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    pub fn calculate_ohlc(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<AdxOutput> {
        let len = high.len().min(low.len()).min(close.len());
        if len < 2 {
            return vec![];
        }

        let mut plus_dm = Vec::with_capacity(len - 1);
        let mut minus_dm = Vec::with_capacity(len - 1);
        for i in 1..len {
            let up_move = high[i] - high[i - 1];
            let down_move = low[i - 1] - low[i];
            plus_dm.push(if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            });
            minus_dm.push(if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            });
        }

        let atr = wilder(&true_range(&high[..len], &low[..len], &close[..len]), self.period);
        let smoothed_plus = wilder(&plus_dm, self.period);
        let smoothed_minus = wilder(&minus_dm, self.period);

        let directional: Vec<(f64, f64)> = atr
            .iter()
            .zip(smoothed_plus.iter().zip(smoothed_minus.iter()))
            .map(|(&tr, (&plus, &minus))| {
                if tr == 0.0 {
                    (0.0, 0.0)
                } else {
                    (100.0 * plus / tr, 100.0 * minus / tr)
                }
            })
            .collect();

        let dx: Vec<f64> = directional
            .iter()
            .map(|&(plus, minus)| {
                let total = plus + minus;
                if total == 0.0 {
                    0.0
                } else {
                    100.0 * (plus - minus).abs() / total
                }
            })
            .collect();

        let adx = wilder(&dx, self.period);
        if adx.is_empty() {
            return vec![];
        }

        directional[self.period - 1..]
            .iter()
            .zip(adx.iter())
            .map(|(&(plus_di, minus_di), &adx)| AdxOutput {
                adx,
                plus_di,
                minus_di,
            })
            .collect()
    }
}

impl Default for Adx {
    fn default() -> Self {
        Self::new(14)
    }
}

impl BarIndicator for Adx {
    type Output = AdxOutput;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<AdxOutput> {
        let values = self.calculate_ohlc(series.highs(), series.lows(), series.closes());
        AlignedSeries::new(self.first_index(), values)
    }

    fn first_index(&self) -> usize {
        2 * self.period - 1
    }

    fn name(&self) -> &str {
        "ADX"
    }
}

/// Lambert's constant scaling CCI so most values fall within +/-100.
pub const CCI_CONSTANT: f64 = 0.015;

/// Commodity Channel Index over typical price.
///
/// A zero mean absolute deviation gives 0.
#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
}

impl Cci {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Cci {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Recurrence for Cci {
    type Output = f64;

    /// `data` is the typical price column.
    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() < self.period {
            return vec![];
        }

        let means = sma(data, self.period);
        let deviations = rolling_mean_abs_dev(data, self.period, &means);

        data[self.period - 1..]
            .iter()
            .zip(means.iter().zip(deviations.iter()))
            .map(|(&tp, (&mean, &mad))| {
                if mad == 0.0 {
                    0.0
                } else {
                    (tp - mean) / (CCI_CONSTANT * mad)
                }
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "CCI"
    }
}

impl BarIndicator for Cci {
    type Output = f64;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<f64> {
        self.calculate_aligned(series.typical_prices())
    }

    fn first_index(&self) -> usize {
        self.period - 1
    }

    fn name(&self) -> &str {
        "CCI"
    }
}
