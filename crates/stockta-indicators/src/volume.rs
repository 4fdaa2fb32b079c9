//! Volume-flow indicators.

use serde::{Deserialize, Serialize};
use stockta_core::traits::BarIndicator;
use stockta_core::types::{AlignedSeries, BarSeries};

use crate::moving_average::ema;
use crate::rolling::CompensatedSum;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// On-Balance Volume.
///
/// Starts at 0 on bar 0, then adds the bar's volume on an up close,
/// subtracts it on a down close and holds on a tie. Accumulates in `i128`
/// so multi-year minute histories cannot overflow.
#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn calculate(&self, close: &[f64], volume: &[u64]) -> Vec<i128> {
        let len = close.len().min(volume.len());
        if len == 0 {
            return vec![];
        }

        let mut result = Vec::with_capacity(len);
        let mut running: i128 = 0;
        result.push(running);

        for i in 1..len {
            let v = i128::from(volume[i]);
            if close[i] > close[i - 1] {
                running += v;
            } else if close[i] < close[i - 1] {
                running -= v;
            }
            result.push(running);
        }

        result
    }
}

impl BarIndicator for Obv {
    type Output = i128;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<i128> {
        AlignedSeries::new(0, self.calculate(series.closes(), series.volumes()))
    }

    fn first_index(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "OBV"
    }
}

/// Accumulation/Distribution line.
///
/// Running sum of the close location value times volume,
/// `((close - low) - (high - close)) / (high - low) * volume`; a bar with
/// `high == low` contributes nothing.
#[derive(Debug, Clone, Default)]
pub struct AdLine;

impl AdLine {
    pub fn calculate(&self, high: &[f64], low: &[f64], close: &[f64], volume: &[u64]) -> Vec<f64> {
        let len = high.len().min(low.len()).min(close.len()).min(volume.len());
        let mut sum = CompensatedSum::new();

        (0..len)
            .map(|i| {
                let range = high[i] - low[i];
                if range != 0.0 {
                    let clv = ((close[i] - low[i]) - (high[i] - close[i])) / range;
                    sum.add(clv * volume[i] as f64);
                }
                sum.value()
            })
            .collect()
    }
}

impl BarIndicator for AdLine {
    type Output = f64;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<f64> {
        let values = self.calculate(
            series.highs(),
            series.lows(),
            series.closes(),
            series.volumes(),
        );
        AlignedSeries::new(0, values)
    }

    fn first_index(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "A/D Line"
    }
}

/// Force Index: EMA of `(close - prev_close) * volume`.
///
/// The raw force starts on bar 1, so the first smoothed value is on bar
/// `period`.
#[derive(Debug, Clone)]
pub struct ForceIndex {
    period: usize,
}

impl ForceIndex {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    pub fn calculate(&self, close: &[f64], volume: &[u64]) -> Vec<f64> {
        let len = close.len().min(volume.len());
        if len < 2 {
            return vec![];
        }

        let force: Vec<f64> = (1..len)
            .map(|i| (close[i] - close[i - 1]) * volume[i] as f64)
            .collect();

        ema(&force, self.period)
    }
}

impl Default for ForceIndex {
    fn default() -> Self {
        Self::new(13)
    }
}

impl BarIndicator for ForceIndex {
    type Output = f64;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<f64> {
        let values = self.calculate(series.closes(), series.volumes());
        AlignedSeries::new(self.first_index(), values)
    }

    fn first_index(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Force Index"
    }
}

/// How VWAP is accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum VwapMode {
    /// Cumulative typical-price-weighted average, reset whenever the local
    /// calendar date (UTC shifted by the offset) changes.
    Session { utc_offset_minutes: i32 },
    /// Trailing window of `window` bars.
    Rolling { window: usize },
    /// Per-bar `close * volume / volume`, which is just the close. Kept to
    /// reproduce previously stored data.
    Close,
}

impl Default for VwapMode {
    fn default() -> Self {
        // NSE session clock (IST, UTC+05:30)
        VwapMode::Session {
            utc_offset_minutes: 330,
        }
    }
}

/// Volume-Weighted Average Price.
///
/// When the accumulated volume is zero the bar's typical price stands in.
#[derive(Debug, Clone, Default)]
pub struct Vwap {
    mode: VwapMode,
}

impl Vwap {
    pub fn new(mode: VwapMode) -> Self {
        if let VwapMode::Rolling { window } = mode {
            assert!(window > 0, "VWAP window must be greater than 0");
        }
        Self { mode }
    }

    pub fn mode(&self) -> VwapMode {
        self.mode
    }

    fn session(&self, series: &BarSeries, utc_offset_minutes: i32) -> Vec<f64> {
        let offset_ms = i64::from(utc_offset_minutes) * 60_000;
        let typical = series.typical_prices();
        let volumes = series.volumes();

        let mut current_day: Option<i64> = None;
        let mut price_volume = CompensatedSum::new();
        let mut total_volume: u128 = 0;

        series
            .timestamps()
            .enumerate()
            .map(|(i, ts)| {
                let day = (ts + offset_ms).div_euclid(MILLIS_PER_DAY);
                if current_day != Some(day) {
                    current_day = Some(day);
                    price_volume = CompensatedSum::new();
                    total_volume = 0;
                }
                price_volume.add(typical[i] * volumes[i] as f64);
                total_volume += u128::from(volumes[i]);

                if total_volume == 0 {
                    typical[i]
                } else {
                    price_volume.value() / total_volume as f64
                }
            })
            .collect()
    }

    fn rolling(&self, series: &BarSeries, window: usize) -> Vec<f64> {
        let typical = series.typical_prices();
        let volumes = series.volumes();
        if typical.len() < window {
            return vec![];
        }

        let mut price_volume = CompensatedSum::new();
        let mut total_volume: u128 = 0;
        let mut result = Vec::with_capacity(typical.len() - window + 1);

        for i in 0..typical.len() {
            price_volume.add(typical[i] * volumes[i] as f64);
            total_volume += u128::from(volumes[i]);
            if i >= window {
                let j = i - window;
                price_volume.add(-(typical[j] * volumes[j] as f64));
                total_volume -= u128::from(volumes[j]);
            }
            if i + 1 >= window {
                result.push(if total_volume == 0 {
                    typical[i]
                } else {
                    price_volume.value() / total_volume as f64
                });
            }
        }

        result
    }
}

impl BarIndicator for Vwap {
    type Output = f64;

    fn compute(&self, series: &BarSeries) -> AlignedSeries<f64> {
        let values = match self.mode {
            VwapMode::Session { utc_offset_minutes } => self.session(series, utc_offset_minutes),
            VwapMode::Rolling { window } => self.rolling(series, window),
            VwapMode::Close => series.closes().to_vec(),
        };
        AlignedSeries::new(self.first_index(), values)
    }

    fn first_index(&self) -> usize {
        match self.mode {
            VwapMode::Rolling { window } => window - 1,
            VwapMode::Session { .. } | VwapMode::Close => 0,
        }
    }

    fn name(&self) -> &str {
        "VWAP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockta_core::types::{Bar, Timeframe};

    const MINUTE: i64 = 60_000;

    fn series(bars: Vec<Bar>) -> BarSeries {
        BarSeries::new("TEST", Timeframe::Minute1, bars).unwrap()
    }

    #[test]
    fn test_obv_seed_and_ties() {
        let close = vec![10.0, 11.0, 11.0, 9.0];
        let volume = vec![500, 100, 200, 50];

        assert_eq!(Obv.calculate(&close, &volume), vec![0, 100, 100, 50]);
    }

    #[test]
    fn test_obv_does_not_overflow_u64_scale() {
        let close: Vec<f64> = (0..4).map(|i| 1.0 + i as f64).collect();
        let volume = vec![u64::MAX; 4];
        let obv = Obv.calculate(&close, &volume);

        assert_eq!(*obv.last().unwrap(), 3 * i128::from(u64::MAX));
    }

    #[test]
    fn test_ad_line() {
        let high = vec![10.0, 12.0, 5.0];
        let low = vec![8.0, 10.0, 5.0];
        let close = vec![10.0, 10.0, 5.0];
        let volume = vec![100, 50, 1_000];

        let ad = AdLine.calculate(&high, &low, &close, &volume);
        // close at high: +1 * 100; close at low: -1 * 50; flat bar adds nothing
        assert_eq!(ad, vec![100.0, 50.0, 50.0]);
    }

    #[test]
    fn test_force_index_alignment() {
        let close: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let volume = vec![10; 20];
        let fi = ForceIndex::new(13).calculate(&close, &volume);

        // 19 raw force values, EMA13 => 7 values from bar 13
        assert_eq!(fi.len(), 7);
        assert!((fi[0] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_session_vwap_resets_each_day() {
        // 2024-01-02 03:45 UTC = 09:15 IST, next day same time
        let day_one = 1_704_167_100_000;
        let day_two = day_one + MILLIS_PER_DAY;
        let s = series(vec![
            Bar::new(day_one, 10.0, 10.0, 10.0, 10.0, 100),
            Bar::new(day_one + MINUTE, 20.0, 20.0, 20.0, 20.0, 300),
            Bar::new(day_two, 50.0, 50.0, 50.0, 50.0, 10),
        ]);

        let vwap = Vwap::default().compute(&s);
        assert_eq!(vwap.start(), 0);
        assert!((vwap.values()[0] - 10.0).abs() < 1e-12);
        // (10*100 + 20*300) / 400
        assert!((vwap.values()[1] - 17.5).abs() < 1e-12);
        assert!((vwap.values()[2] - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_session_boundary_uses_offset() {
        // 18:00 UTC and 19:00 UTC straddle IST midnight (18:30 UTC)
        let evening = 1_704_218_400_000;
        let s = series(vec![
            Bar::new(evening, 10.0, 10.0, 10.0, 10.0, 100),
            Bar::new(evening + 60 * MINUTE, 30.0, 30.0, 30.0, 30.0, 100),
        ]);

        let ist = Vwap::new(VwapMode::Session { utc_offset_minutes: 330 }).compute(&s);
        let utc = Vwap::new(VwapMode::Session { utc_offset_minutes: 0 }).compute(&s);

        assert!((ist.values()[1] - 30.0).abs() < 1e-12);
        assert!((utc.values()[1] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_volume_falls_back_to_typical_price() {
        let s = series(vec![Bar::new(0, 10.0, 12.0, 9.0, 12.0, 0)]);
        let vwap = Vwap::default().compute(&s);

        assert!((vwap.values()[0] - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_vwap() {
        let bars: Vec<Bar> = (0..4)
            .map(|i| {
                let p = 10.0 * (i + 1) as f64;
                Bar::new(i * MINUTE, p, p, p, p, 1)
            })
            .collect();
        let vwap = Vwap::new(VwapMode::Rolling { window: 2 }).compute(&series(bars));

        assert_eq!(vwap.start(), 1);
        assert_eq!(vwap.len(), 3);
        assert!((vwap.values()[0] - 15.0).abs() < 1e-12);
        assert!((vwap.values()[2] - 35.0).abs() < 1e-12);
    }

    #[test]
    fn test_close_mode_echoes_close() {
        let s = series(vec![Bar::new(0, 10.0, 12.0, 9.0, 11.0, 5)]);
        let vwap = Vwap::new(VwapMode::Close).compute(&s);

        assert_eq!(vwap.values(), &[11.0]);
    }
}
