// SPDX-License-Identifier: MIT OR Apache-2.0
//! Best-effort timestamp parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Numbers at or above this are read as unix milliseconds, below as seconds.
const MILLIS_THRESHOLD: f64 = 1_000_000_000_000.0;

/// Parse a JSON value into a UTC timestamp.
///
/// Accepts unix seconds or milliseconds (numeric), RFC 3339 strings, naive
/// `YYYY-MM-DDTHH:MM:SS` strings (interpreted as UTC), and bare dates. Any
/// failure yields `None`; this never panics.
///
/// # Examples
///
/// ```
/// use serde_json::json;
///
/// assert!(mp_core::parse_ts(&json!("2026-02-01T10:00:00Z")).is_some());
/// assert!(mp_core::parse_ts(&json!(1_706_781_600)).is_some());
/// assert!(mp_core::parse_ts(&json!("not a date")).is_none());
/// ```
#[must_use]
pub fn parse_ts(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => from_unix(n.as_f64()?),
        Value::String(s) => from_str(s),
        _ => None,
    }
}

fn from_unix(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() {
        return None;
    }
    let secs = if raw >= MILLIS_THRESHOLD { raw / 1000.0 } else { raw };
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos)
}

fn from_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive forms are interpreted as UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}
