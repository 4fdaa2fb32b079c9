//! Per-bar indicator output.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::str::FromStr;

/// Indicator family, used for grouping in listings and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Trend,
    Momentum,
    Volatility,
    Volume,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Family::Trend => "trend",
            Family::Momentum => "momentum",
            Family::Volatility => "volatility",
            Family::Volume => "volume",
        };
        write!(f, "{}", s)
    }
}

/// Every named value an [`IndicatorRecord`] can carry.
///
/// The declaration order is the column order used by persistence adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Sma20,
    Sma50,
    Sma200,
    Ema12,
    Ema26,
    Macd,
    MacdSignal,
    MacdHistogram,
    Rsi,
    StochK,
    StochD,
    BbUpper,
    BbMiddle,
    BbLower,
    Atr,
    Adx,
    PlusDi,
    MinusDi,
    Cci,
    WilliamsR,
    Roc,
    Obv,
    Vwap,
    ForceIndex,
    AdLine,
}

impl Field {
    pub const COUNT: usize = 25;

    pub const ALL: [Field; Field::COUNT] = [
        Field::Sma20,
        Field::Sma50,
        Field::Sma200,
        Field::Ema12,
        Field::Ema26,
        Field::Macd,
        Field::MacdSignal,
        Field::MacdHistogram,
        Field::Rsi,
        Field::StochK,
        Field::StochD,
        Field::BbUpper,
        Field::BbMiddle,
        Field::BbLower,
        Field::Atr,
        Field::Adx,
        Field::PlusDi,
        Field::MinusDi,
        Field::Cci,
        Field::WilliamsR,
        Field::Roc,
        Field::Obv,
        Field::Vwap,
        Field::ForceIndex,
        Field::AdLine,
    ];

    /// Column name as stored downstream.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Sma20 => "sma20",
            Field::Sma50 => "sma50",
            Field::Sma200 => "sma200",
            Field::Ema12 => "ema12",
            Field::Ema26 => "ema26",
            Field::Macd => "macd",
            Field::MacdSignal => "macdSignal",
            Field::MacdHistogram => "macdHistogram",
            Field::Rsi => "rsi",
            Field::StochK => "stochK",
            Field::StochD => "stochD",
            Field::BbUpper => "bbUpper",
            Field::BbMiddle => "bbMiddle",
            Field::BbLower => "bbLower",
            Field::Atr => "atr",
            Field::Adx => "adx",
            Field::PlusDi => "plusDI",
            Field::MinusDi => "minusDI",
            Field::Cci => "cci",
            Field::WilliamsR => "williamsR",
            Field::Roc => "roc",
            Field::Obv => "obv",
            Field::Vwap => "vwap",
            Field::ForceIndex => "forceIndex",
            Field::AdLine => "adLine",
        }
    }

    pub fn family(&self) -> Family {
        match self {
            Field::Sma20
            | Field::Sma50
            | Field::Sma200
            | Field::Ema12
            | Field::Ema26
            | Field::Macd
            | Field::MacdSignal
            | Field::MacdHistogram
            | Field::Adx
            | Field::PlusDi
            | Field::MinusDi
            | Field::Cci => Family::Trend,
            Field::Rsi | Field::StochK | Field::StochD | Field::WilliamsR | Field::Roc => {
                Family::Momentum
            }
            Field::BbUpper | Field::BbMiddle | Field::BbLower | Field::Atr => Family::Volatility,
            Field::Obv | Field::Vwap | Field::ForceIndex | Field::AdLine => Family::Volume,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown indicator: {}", s))
    }
}

/// A defined indicator value.
///
/// Cumulative volume counts are exact integers; everything else is `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Count(i128),
    Real(f64),
}

impl Value {
    /// Numeric view, lossy for counts beyond 2^53.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Real(v) => v,
            Value::Count(c) => c as f64,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Value::Real(v) => serializer.serialize_f64(v),
            Value::Count(c) => serializer.serialize_i128(c),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Real(v) => write!(f, "{}", v),
            Value::Count(c) => write!(f, "{}", c),
        }
    }
}

/// The computed output for one bar: indicator name to value, with
/// "not yet warmed up" kept distinct from a legitimate zero.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRecord {
    pub timestamp: i64,
    values: [Option<Value>; Field::COUNT],
}

impl IndicatorRecord {
    /// A record with every indicator absent.
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            values: [None; Field::COUNT],
        }
    }

    #[inline]
    pub fn get(&self, field: Field) -> Option<Value> {
        self.values[field.slot()]
    }

    /// Real-valued view of a field.
    pub fn real(&self, field: Field) -> Option<f64> {
        self.get(field).map(|v| v.as_f64())
    }

    /// Lookup by column name (`"macdSignal"`, `"rsi"`, ...).
    pub fn get_by_name(&self, name: &str) -> Option<Value> {
        name.parse::<Field>().ok().and_then(|f| self.get(f))
    }

    #[inline]
    pub fn set(&mut self, field: Field, value: Value) {
        self.values[field.slot()] = Some(value);
    }

    pub fn is_defined(&self, field: Field) -> bool {
        self.values[field.slot()].is_some()
    }

    /// Defined values in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, Value)> + '_ {
        Field::ALL
            .iter()
            .filter_map(move |&f| self.values[f.slot()].map(|v| (f, v)))
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

impl Serialize for IndicatorRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.defined_count()))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.name(), &value)?;
        }
        map.end()
    }
}
