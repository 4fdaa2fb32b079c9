//! Bar spacing definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nominal spacing between consecutive bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    /// 1 minute bars
    #[serde(rename = "1m")]
    #[default]
    Minute1,
    /// 3 minute bars
    #[serde(rename = "3m")]
    Minute3,
    /// 5 minute bars
    #[serde(rename = "5m")]
    Minute5,
    /// 15 minute bars
    #[serde(rename = "15m")]
    Minute15,
    /// 30 minute bars
    #[serde(rename = "30m")]
    Minute30,
    /// 1 hour bars
    #[serde(rename = "1h")]
    Hour1,
    /// Daily bars
    #[serde(rename = "1d")]
    Daily,
}

impl Timeframe {
    /// Get the duration of the timeframe in seconds.
    pub fn as_secs(&self) -> i64 {
        match self {
            Timeframe::Minute1 => 60,
            Timeframe::Minute3 => 180,
            Timeframe::Minute5 => 300,
            Timeframe::Minute15 => 900,
            Timeframe::Minute30 => 1800,
            Timeframe::Hour1 => 3600,
            Timeframe::Daily => 86400,
        }
    }

    /// Get the duration of the timeframe in milliseconds.
    pub fn as_millis(&self) -> i64 {
        self.as_secs() * 1000
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute3 => "3m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Hour1 => "1h",
            Timeframe::Daily => "1d",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    /// Accepts short forms (`1m`, `1d`) and broker interval names
    /// (`ONE_MINUTE`, `ONE_DAY`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "1min" | "minute" | "one_minute" => Ok(Timeframe::Minute1),
            "3m" | "3min" | "three_minute" => Ok(Timeframe::Minute3),
            "5m" | "5min" | "five_minute" => Ok(Timeframe::Minute5),
            "15m" | "15min" | "fifteen_minute" => Ok(Timeframe::Minute15),
            "30m" | "30min" | "thirty_minute" => Ok(Timeframe::Minute30),
            "1h" | "hour" | "one_hour" => Ok(Timeframe::Hour1),
            "1d" | "day" | "daily" | "one_day" => Ok(Timeframe::Daily),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_duration() {
        assert_eq!(Timeframe::Minute1.as_millis(), 60_000);
        assert_eq!(Timeframe::Daily.as_secs(), 86400);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!(Timeframe::from_str("1m").unwrap(), Timeframe::Minute1);
        assert_eq!(Timeframe::from_str("ONE_MINUTE").unwrap(), Timeframe::Minute1);
        assert_eq!(Timeframe::from_str("FIVE_MINUTE").unwrap(), Timeframe::Minute5);
        assert_eq!(Timeframe::from_str("daily").unwrap(), Timeframe::Daily);
        assert!(Timeframe::from_str("fortnight").is_err());
    }

    #[test]
    fn test_timeframe_display_round_trips() {
        for tf in [Timeframe::Minute3, Timeframe::Hour1, Timeframe::Daily] {
            assert_eq!(Timeframe::from_str(&tf.to_string()).unwrap(), tf);
        }
    }
}
