//! Broker candle tuples.
//!
//! Historical-candle endpoints answer with positional arrays
//! `[timestamp, open, high, low, close, volume]`, either bare or wrapped in
//! a `{"data": [...]}` envelope. Prices arrive as numbers or numeric
//! strings; both are converted into [`Bar`]s here and nowhere else.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use stockta_core::error::DataError;
use stockta_core::types::Bar;

use crate::csv_source::parse_volume;
use crate::timestamp::{from_unix, parse_timestamp};

/// A scalar that may be sent as a number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn price(&self) -> Result<f64, String> {
        match self {
            Scalar::Int(v) => Ok(*v as f64),
            Scalar::Float(v) => Ok(*v),
            Scalar::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("Could not parse price: {}", s)),
        }
    }

    fn volume(&self) -> Result<u64, String> {
        match self {
            Scalar::Int(v) => u64::try_from(*v).map_err(|_| format!("Negative volume: {}", v)),
            Scalar::Float(v) => parse_volume(&v.to_string()),
            Scalar::Text(s) => parse_volume(s),
        }
    }

    fn timestamp(&self) -> Result<i64, String> {
        match self {
            Scalar::Int(v) => Ok(from_unix(*v)),
            Scalar::Float(v) if v.fract() == 0.0 => Ok(from_unix(*v as i64)),
            Scalar::Float(v) => Err(format!("Could not parse timestamp: {}", v)),
            Scalar::Text(s) => {
                parse_timestamp(s).ok_or_else(|| format!("Could not parse timestamp: {}", s))
            }
        }
    }
}

type RawCandle = (Scalar, Scalar, Scalar, Scalar, Scalar, Scalar);

/// Parse a candle payload into bars, in payload order.
pub fn parse_candles(json: &str) -> Result<Vec<Bar>, DataError> {
    let payload: JsonValue = serde_json::from_str(json).map_err(|e| DataError::Parse {
        record: 0,
        message: e.to_string(),
    })?;

    let rows = match payload {
        JsonValue::Array(rows) => rows,
        JsonValue::Object(mut envelope) => match envelope.remove("data") {
            Some(JsonValue::Array(rows)) => rows,
            Some(JsonValue::Null) | None => {
                return Err(DataError::NoDataAvailable("candle payload has no data".into()))
            }
            Some(other) => {
                return Err(DataError::Parse {
                    record: 0,
                    message: format!("Expected a candle array, got {}", other),
                })
            }
        },
        other => {
            return Err(DataError::Parse {
                record: 0,
                message: format!("Expected a candle array, got {}", other),
            })
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            candle_to_bar(row).map_err(|message| DataError::Parse {
                record: index,
                message,
            })
        })
        .collect()
}

fn candle_to_bar(row: JsonValue) -> Result<Bar, String> {
    let (ts, open, high, low, close, volume): RawCandle =
        serde_json::from_value(row).map_err(|e| e.to_string())?;

    Ok(Bar::new(
        ts.timestamp()?,
        open.price()?,
        high.price()?,
        low.price()?,
        close.price()?,
        volume.volume()?,
    ))
}
