//! SIMD helpers for window seeding.
//!
//! Uses the `wide` crate for portable SIMD. Every recurrence seeds its first
//! window through [`window_mean`], so SMA, EMA and Wilder agree bit for bit
//! on the seed value.

use wide::f64x4;

/// SIMD-optimized sum of a slice.
pub fn sum_simd(data: &[f64]) -> f64 {
    let chunks = data.len() / 4;
    let mut simd_sum = f64x4::splat(0.0);

    for i in 0..chunks {
        let idx = i * 4;
        let values = f64x4::new([data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]);
        simd_sum += values;
    }

    let mut result = simd_sum.reduce_add();

    // Handle remaining elements
    for &value in &data[(chunks * 4)..] {
        result += value;
    }

    result
}

/// Arithmetic mean of a non-empty window.
#[inline]
pub fn window_mean(window: &[f64]) -> f64 {
    sum_simd(window) / window.len() as f64
}

/// Mean absolute deviation of `window` around `center`.
pub fn mean_abs_dev_simd(window: &[f64], center: f64) -> f64 {
    let chunks = window.len() / 4;
    let center_vec = f64x4::splat(center);
    let mut acc = f64x4::splat(0.0);

    for i in 0..chunks {
        let idx = i * 4;
        let values = f64x4::new([
            window[idx],
            window[idx + 1],
            window[idx + 2],
            window[idx + 3],
        ]);
        acc += (values - center_vec).abs();
    }

    let mut total = acc.reduce_add();
    for &value in &window[(chunks * 4)..] {
        total += (value - center).abs();
    }

    total / window.len() as f64
}
