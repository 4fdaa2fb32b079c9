//! Per-bar indicator engine.
//!
//! Runs every indicator over a validated [`BarSeries`] and lays the results
//! out as one [`IndicatorRecord`] per bar. Each indicator reports where its
//! output starts; the engine places values by absolute bar index from that
//! anchor, so no indicator is ever read at a shifted offset.

use serde::{Deserialize, Serialize};
use stockta_core::traits::{BarIndicator, Recurrence};
use stockta_core::types::{AlignedSeries, BarSeries, Family, Field, IndicatorRecord, Value};
use tracing::{debug, warn};

use crate::momentum::{Roc, Rsi, Stochastic, WilliamsR};
use crate::moving_average::{Ema, Sma};
use crate::rolling::Dispersion;
use crate::trend::{Adx, Cci, Macd};
use crate::volatility::{Atr, BollingerBands};
use crate::volume::{AdLine, ForceIndex, Obv, Vwap, VwapMode};

/// Knobs that change indicator semantics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    pub vwap: VwapMode,
    pub bollinger_dispersion: Dispersion,
}

/// One row of the indicator catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub field: Field,
    pub family: Family,
    /// First bar index with a defined value.
    pub first_index: usize,
}

/// Computes the full indicator set for a bar series.
///
/// Stateless between calls: the same series always yields the same records,
/// so the engine is shared freely across instruments and threads.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    settings: EngineSettings,
    sma20: Sma,
    sma50: Sma,
    sma200: Sma,
    ema12: Ema,
    ema26: Ema,
    macd: Macd,
    rsi: Rsi,
    stochastic: Stochastic,
    bollinger: BollingerBands,
    atr: Atr,
    adx: Adx,
    cci: Cci,
    williams_r: WilliamsR,
    roc: Roc,
    obv: Obv,
    vwap: Vwap,
    force_index: ForceIndex,
    ad_line: AdLine,
}

impl IndicatorEngine {
    pub fn new(settings: EngineSettings) -> Self {
        if settings.vwap == VwapMode::Close {
            warn!("VWAP close mode reproduces the close price; use session or rolling mode for a volume-weighted average");
        }

        Self {
            settings,
            sma20: Sma::new(20),
            sma50: Sma::new(50),
            sma200: Sma::new(200),
            ema12: Ema::new(12),
            ema26: Ema::new(26),
            macd: Macd::new(),
            rsi: Rsi::default(),
            stochastic: Stochastic::new(),
            bollinger: BollingerBands::new().with_dispersion(settings.bollinger_dispersion),
            atr: Atr::default(),
            adx: Adx::default(),
            cci: Cci::default(),
            williams_r: WilliamsR::default(),
            roc: Roc::default(),
            obv: Obv,
            vwap: Vwap::new(settings.vwap),
            force_index: ForceIndex::default(),
            ad_line: AdLine,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Compute one record per bar, aligned 1:1 with the input.
    ///
    /// A bar before an indicator's first index leaves that indicator
    /// absent. OBV, A/D line and session or close VWAP start at bar 0, so
    /// even a single-bar series carries those three.
    ///
    /// Non-finite results are left absent and logged. Valid prices can
    /// still get there: closes near `f64::MAX` overflow the window sums,
    /// leaving e.g. `sma20` absent past its first index.
    pub fn compute(&self, series: &BarSeries) -> Vec<IndicatorRecord> {
        let mut records: Vec<IndicatorRecord> =
            series.timestamps().map(IndicatorRecord::new).collect();
        if records.is_empty() {
            return records;
        }

        let closes = series.closes();

        place(&mut records, self.sma20.calculate_aligned(closes), |r, v| {
            set_real(r, Field::Sma20, v)
        });
        place(&mut records, self.sma50.calculate_aligned(closes), |r, v| {
            set_real(r, Field::Sma50, v)
        });
        place(&mut records, self.sma200.calculate_aligned(closes), |r, v| {
            set_real(r, Field::Sma200, v)
        });
        place(&mut records, self.ema12.calculate_aligned(closes), |r, v| {
            set_real(r, Field::Ema12, v)
        });
        place(&mut records, self.ema26.calculate_aligned(closes), |r, v| {
            set_real(r, Field::Ema26, v)
        });

        place(&mut records, self.macd.compute(series), |r, out| {
            set_real(r, Field::Macd, out.macd);
            set_real(r, Field::MacdSignal, out.signal);
            set_real(r, Field::MacdHistogram, out.histogram);
        });
        place(&mut records, BarIndicator::compute(&self.rsi, series), |r, v| {
            set_real(r, Field::Rsi, v)
        });
        place(&mut records, self.stochastic.compute(series), |r, out| {
            set_real(r, Field::StochK, out.k);
            set_real(r, Field::StochD, out.d);
        });
        place(&mut records, self.bollinger.compute(series), |r, out| {
            set_real(r, Field::BbUpper, out.upper);
            set_real(r, Field::BbMiddle, out.middle);
            set_real(r, Field::BbLower, out.lower);
        });
        place(&mut records, self.atr.compute(series), |r, v| {
            set_real(r, Field::Atr, v)
        });
        place(&mut records, self.adx.compute(series), |r, out| {
            set_real(r, Field::Adx, out.adx);
            set_real(r, Field::PlusDi, out.plus_di);
            set_real(r, Field::MinusDi, out.minus_di);
        });
        place(&mut records, BarIndicator::compute(&self.cci, series), |r, v| {
            set_real(r, Field::Cci, v)
        });
        place(&mut records, self.williams_r.compute(series), |r, v| {
            set_real(r, Field::WilliamsR, v)
        });
        place(&mut records, BarIndicator::compute(&self.roc, series), |r, v| {
            set_real(r, Field::Roc, v)
        });

        place(&mut records, self.obv.compute(series), |r, v| {
            r.set(Field::Obv, Value::Count(v))
        });
        place(&mut records, self.vwap.compute(series), |r, v| {
            set_real(r, Field::Vwap, v)
        });
        place(&mut records, self.force_index.compute(series), |r, v| {
            set_real(r, Field::ForceIndex, v)
        });
        place(&mut records, self.ad_line.compute(series), |r, v| {
            set_real(r, Field::AdLine, v)
        });

        debug!(
            "Computed {} records for {} ({} bars)",
            records.len(),
            series.symbol(),
            series.len()
        );

        records
    }

    /// First bar index at which `field` is defined.
    pub fn first_index(&self, field: Field) -> usize {
        match field {
            Field::Sma20 => self.sma20.period() - 1,
            Field::Sma50 => self.sma50.period() - 1,
            Field::Sma200 => self.sma200.period() - 1,
            Field::Ema12 => self.ema12.period() - 1,
            Field::Ema26 => self.ema26.period() - 1,
            Field::Macd | Field::MacdSignal | Field::MacdHistogram => {
                BarIndicator::first_index(&self.macd)
            }
            Field::Rsi => BarIndicator::first_index(&self.rsi),
            Field::StochK | Field::StochD => self.stochastic.first_index(),
            Field::BbUpper | Field::BbMiddle | Field::BbLower => {
                BarIndicator::first_index(&self.bollinger)
            }
            Field::Atr => self.atr.first_index(),
            Field::Adx | Field::PlusDi | Field::MinusDi => self.adx.first_index(),
            Field::Cci => BarIndicator::first_index(&self.cci),
            Field::WilliamsR => self.williams_r.first_index(),
            Field::Roc => BarIndicator::first_index(&self.roc),
            Field::Obv => self.obv.first_index(),
            Field::Vwap => self.vwap.first_index(),
            Field::ForceIndex => self.force_index.first_index(),
            Field::AdLine => self.ad_line.first_index(),
        }
    }

    /// Every field in column order with its family and first index.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        Field::ALL
            .iter()
            .map(|&field| CatalogEntry {
                field,
                family: field.family(),
                first_index: self.first_index(field),
            })
            .collect()
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

fn place<T>(
    records: &mut [IndicatorRecord],
    series: AlignedSeries<T>,
    mut write: impl FnMut(&mut IndicatorRecord, T),
) {
    debug_assert!(
        series.is_empty() || series.end() == records.len(),
        "indicator output must end on the last bar"
    );
    for (index, value) in series.into_indexed() {
        if let Some(record) = records.get_mut(index) {
            write(record, value);
        }
    }
}

fn set_real(record: &mut IndicatorRecord, field: Field, value: f64) {
    if value.is_finite() {
        record.set(field, Value::Real(value));
    } else {
        warn!(
            "Discarding non-finite {} value {} at timestamp {}",
            field, value, record.timestamp
        );
    }
}
