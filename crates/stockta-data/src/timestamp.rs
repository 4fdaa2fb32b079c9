//! Timestamp parsing shared by the CSV and candle readers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// Numbers above this are taken as milliseconds, below as seconds.
const MILLIS_THRESHOLD: i64 = 10_000_000_000;

/// Parse a timestamp into Unix milliseconds.
///
/// Accepts RFC 3339 (offset honored), naive date-times and dates (read as
/// UTC), and Unix seconds or milliseconds.
pub(crate) fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, format) {
            return Some(d.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    raw.parse::<i64>().ok().map(from_unix)
}

/// Interpret a bare Unix number as seconds or milliseconds.
///
/// Magnitudes up to `1e10` are seconds (good until 2286), larger ones
/// milliseconds. A millisecond value before 1970-04-26T17:46:40Z is
/// therefore read as seconds; such data must use RFC 3339 strings.
pub(crate) fn from_unix(ts: i64) -> i64 {
    if ts.abs() > MILLIS_THRESHOLD {
        ts
    } else {
        ts * 1000
    }
}
