//! Technical indicators over OHLCV bar series.
//!
//! This crate provides the recurrences and the per-bar engine:
//! - Moving averages (SMA, EMA, Wilder smoothing)
//! - Momentum indicators (RSI, Stochastic, Williams %R, ROC)
//! - Trend indicators (MACD, ADX with +DI/-DI, CCI)
//! - Volatility indicators (ATR, Bollinger Bands)
//! - Volume indicators (OBV, VWAP, Force Index, A/D line)
//!
//! Window seeds are summed with SIMD lanes; rolling statistics are O(1)
//! per bar so minute histories of several years stay cheap to recompute.

pub mod engine;
pub mod momentum;
pub mod moving_average;
pub mod rolling;
pub mod simd;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use engine::{CatalogEntry, EngineSettings, IndicatorEngine};
pub use momentum::{Roc, Rsi, Stochastic, StochasticOutput, WilliamsR};
pub use moving_average::{ema, sma, wilder, Ema, Sma, Wilder};
pub use rolling::{
    rolling_max, rolling_mean_abs_dev, rolling_min, rolling_std_dev, rolling_std_dev_with,
    CompensatedSum, Dispersion,
};
pub use trend::{Adx, AdxOutput, Cci, Macd, MacdOutput};
pub use volatility::{true_range, Atr, BollingerBands, BollingerOutput};
pub use volume::{AdLine, ForceIndex, Obv, Vwap, VwapMode};
