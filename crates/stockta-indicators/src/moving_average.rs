//! Moving average recurrences.
//!
//! All three share the "valid length" contract: `N - period + 1` outputs,
//! element `0` belonging to input index `period - 1`, empty when
//! `N < period`. EMA and Wilder are both seeded with the SMA of the first
//! window but use different smoothing constants and are kept apart.

use stockta_core::traits::Recurrence;

use crate::rolling::CompensatedSum;
use crate::simd::{sum_simd, window_mean};

/// Rolling arithmetic mean, O(N) via a compensated running sum.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    let period_f64 = period as f64;

    // Initial sum
    let mut sum = CompensatedSum::from(sum_simd(&values[..period]));
    result.push(sum.value() / period_f64);

    // Sliding window
    for i in period..values.len() {
        sum.add(values[i]);
        sum.add(-values[i - period]);
        result.push(sum.value() / period_f64);
    }

    result
}

/// Exponential moving average with `alpha = 2 / (period + 1)`.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![];
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    smooth(values, period, alpha)
}

/// Wilder's smoothing, `alpha = 1 / period`.
///
/// Written as `(prev * (period - 1) + value) / period`, which keeps the
/// recurrence exact for integer-valued inputs.
pub fn wilder(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    let period_f64 = period as f64;

    let mut avg = window_mean(&values[..period]);
    result.push(avg);

    for &value in &values[period..] {
        avg = (avg * (period_f64 - 1.0) + value) / period_f64;
        result.push(avg);
    }

    result
}

fn smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    if values.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);

    // Initialize with SMA
    let mut current = window_mean(&values[..period]);
    result.push(current);

    let one_minus_alpha = 1.0 - alpha;
    for &value in &values[period..] {
        current = value * alpha + current * one_minus_alpha;
        result.push(current);
    }

    result
}

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self {
            period,
            name: format!("SMA{}", period),
        }
    }
}

impl Recurrence for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        sma(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices using an exponential decay.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self {
            period,
            name: format!("EMA{}", period),
        }
    }
}

impl Recurrence for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        ema(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wilder's smoothed average, as used by RSI, ATR and ADX.
#[derive(Debug, Clone)]
pub struct Wilder {
    period: usize,
}

impl Wilder {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Recurrence for Wilder {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        wilder(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Wilder"
    }
}
