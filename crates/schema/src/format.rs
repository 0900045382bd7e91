//! Text rendering helpers for timestamps and currency amounts.

use chrono::{DateTime, NaiveDateTime};

use crate::error::SchemaError;

/// Rendered in place of a cell whose value does not fit its column.
pub const PLACEHOLDER: &str = "?";

const NANOS_PER_SEC: i64 = 1_000_000_000;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Formats nanoseconds since the epoch as `YYYY-mm-dd HH:MM:SS.nnnnnnnnn`
/// (UTC). Trailing zeros of the fraction are trimmed, and so is the dot when
/// the fraction is zero.
///
/// ```rust
/// assert_eq!(
///     schema::format_nanos(1_073_077_200_000_054_742),
///     "2004-01-02 21:00:00.000054742"
/// );
/// assert_eq!(schema::format_nanos(0), "1970-01-01 00:00:00");
/// ```
pub fn format_nanos(nanos: i64) -> String {
    let secs = nanos.div_euclid(NANOS_PER_SEC);
    let sub = nanos.rem_euclid(NANOS_PER_SEC) as u32;
    match DateTime::from_timestamp(secs, sub) {
        Some(dt) => {
            let text = format!("{}.{:09}", dt.format(DATE_FORMAT), sub);
            trim_fraction(&text).to_string()
        }
        None => nanos.to_string(),
    }
}

/// Parses `YYYY-mm-dd HH:MM:SS[.fraction]` (UTC) into nanoseconds.
pub fn parse_nanos(text: &str) -> Result<i64, SchemaError> {
    let invalid = || SchemaError::InvalidTimestamp(text.to_string());
    let dt = NaiveDateTime::parse_from_str(text.trim(), PARSE_FORMAT).map_err(|_| invalid())?;
    dt.and_utc().timestamp_nanos_opt().ok_or_else(invalid)
}

/// Formats micro-cents as a decimal amount with trailing zeros trimmed:
/// `40_230_000` renders as `40.23`.
pub fn format_micro_cents(micros: i64) -> String {
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    let text = format!("{sign}{}.{:06}", abs / 1_000_000, abs % 1_000_000);
    trim_fraction(&text).to_string()
}

fn trim_fraction(text: &str) -> &str {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.')
}
