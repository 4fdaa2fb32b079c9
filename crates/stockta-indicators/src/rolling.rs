//! Rolling-window primitives: compensated sums, extrema and dispersion.
//!
//! Every function here is amortized O(1) per input element, except
//! [`rolling_mean_abs_dev`], which is O(period) per element because the
//! deviation center moves with the window.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::simd::{mean_abs_dev_simd, window_mean};

/// Running sum with Neumaier compensation.
///
/// Long minute-bar histories add and subtract hundreds of thousands of
/// terms; the compensation term keeps the rolling sum from drifting away
/// from a fresh re-summation of the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

impl From<f64> for CompensatedSum {
    fn from(sum: f64) -> Self {
        Self {
            sum,
            compensation: 0.0,
        }
    }
}

/// Monotonic deque of indices for sliding-window extrema.
///
/// For a max deque the referenced values are decreasing front to back, so
/// the front is always the window maximum; a min deque is the mirror image.
#[derive(Debug, Clone)]
struct MonotonicDeque {
    deque: VecDeque<usize>,
    period: usize,
    keep_max: bool,
}

impl MonotonicDeque {
    fn new(period: usize, keep_max: bool) -> Self {
        Self {
            deque: VecDeque::with_capacity(period),
            period,
            keep_max,
        }
    }

    #[inline]
    fn push(&mut self, index: usize, data: &[f64]) {
        let value = data[index];
        while let Some(&back) = self.deque.back() {
            let dominated = if self.keep_max {
                value >= data[back]
            } else {
                value <= data[back]
            };
            if !dominated {
                break;
            }
            self.deque.pop_back();
        }
        self.deque.push_back(index);

        // Expire indices that slid out of the window
        while let Some(&front) = self.deque.front() {
            if front + self.period <= index {
                self.deque.pop_front();
            } else {
                break;
            }
        }
    }

    #[inline]
    fn front_value(&self, data: &[f64]) -> Option<f64> {
        self.deque.front().map(|&i| data[i])
    }
}

fn rolling_extreme(values: &[f64], period: usize, keep_max: bool) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return vec![];
    }

    let mut deque = MonotonicDeque::new(period, keep_max);
    let mut result = Vec::with_capacity(values.len() - period + 1);

    for i in 0..values.len() {
        deque.push(i, values);
        if i + 1 >= period {
            if let Some(v) = deque.front_value(values) {
                result.push(v);
            }
        }
    }

    result
}

/// Trailing-window maximum.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, true)
}

/// Trailing-window minimum.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, false)
}

/// Divisor convention for window variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dispersion {
    /// Divide by `period`.
    Population,
    /// Divide by `period - 1`.
    #[default]
    Sample,
}

impl Dispersion {
    fn divisor(self, period: usize) -> usize {
        match self {
            Dispersion::Population => period,
            Dispersion::Sample => period.saturating_sub(1),
        }
    }
}

/// Windows between exact re-seeds of the running variance state.
const RESEED_INTERVAL: usize = 4096;

fn exact_window_state(window: &[f64]) -> (f64, f64) {
    let mean = window_mean(window);
    let m2 = window.iter().map(|x| (x - mean) * (x - mean)).sum();
    (mean, m2)
}

/// Trailing-window standard deviation.
///
/// Sliding Welford updates keep it O(1) per step; the window state is
/// recomputed exactly every few thousand steps so rounding error cannot
/// accumulate across very long series. Empty when the divisor would be 0.
pub fn rolling_std_dev_with(values: &[f64], period: usize, dispersion: Dispersion) -> Vec<f64> {
    let divisor = dispersion.divisor(period);
    if period == 0 || divisor == 0 || values.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    let period_f64 = period as f64;
    let divisor_f64 = divisor as f64;

    let (mut mean, mut m2) = exact_window_state(&values[..period]);
    result.push((m2.max(0.0) / divisor_f64).sqrt());

    for i in period..values.len() {
        let step = i - period + 1;
        if step % RESEED_INTERVAL == 0 {
            let state = exact_window_state(&values[step..=i]);
            mean = state.0;
            m2 = state.1;
        } else {
            let incoming = values[i];
            let outgoing = values[i - period];
            let next_mean = mean + (incoming - outgoing) / period_f64;
            m2 += (incoming - outgoing) * (incoming - next_mean + outgoing - mean);
            mean = next_mean;
        }
        result.push((m2.max(0.0) / divisor_f64).sqrt());
    }

    result
}

/// Trailing-window sample standard deviation (divisor `period - 1`).
pub fn rolling_std_dev(values: &[f64], period: usize) -> Vec<f64> {
    rolling_std_dev_with(values, period, Dispersion::Sample)
}

/// Mean absolute deviation of each trailing window around `centers`.
///
/// `centers` is the aligned rolling mean (length `N - period + 1`).
pub fn rolling_mean_abs_dev(values: &[f64], period: usize, centers: &[f64]) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return vec![];
    }

    values
        .windows(period)
        .zip(centers.iter())
        .map(|(window, &center)| mean_abs_dev_simd(window, center))
        .collect()
}
