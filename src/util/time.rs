//! Time anchor parsing and wall-clock helpers.

use crate::error::{ConvertError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Zone names accepted after the clock time, all meaning UTC.
const UTC_ZONE_NAMES: &[&str] = &["UTC", "GMT", "Z"];

/// Parse a start time such as `2025-05-20 13:38:35 +0000` or
/// `2025-04-08 07:17:34 UTC` into a UTC timestamp.
///
/// Returns `None` for empty or unrecognized input.
#[must_use]
pub fn parse_start_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }

    let (clock, zone) = value.rsplit_once(' ')?;
    if !UTC_ZONE_NAMES
        .iter()
        .any(|name| zone.eq_ignore_ascii_case(name))
    {
        return None;
    }

    NaiveDateTime::parse_from_str(clock.trim(), "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse a start time into epoch milliseconds.
///
/// # Errors
///
/// Returns `ConvertError::InvalidStartTime` if the value is not recognized.
pub fn parse_start_time_ms(value: &str) -> Result<i64> {
    parse_start_time(value)
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| ConvertError::invalid_start_time(value))
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
