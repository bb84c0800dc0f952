use crate::error::{ForwarderError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

// Tried after RFC 3339 for inputs that carry an explicit offset
const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

// Date-times without an offset are taken as UTC
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Resolve an optional source timestamp to nanoseconds since the UNIX epoch.
///
/// A present candidate must parse; an absent one falls back to the wall clock
/// read at call time.
pub fn resolve_timestamp_ns(candidate: Option<&str>) -> Result<i64> {
    match candidate {
        Some(text) => iso_to_ns(text),
        None => Ok(current_timestamp_ns()),
    }
}

/// Current wall-clock time in nanoseconds since the UNIX epoch.
pub fn current_timestamp_ns() -> i64 {
    let now = Utc::now();
    now.timestamp()
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(i64::from(now.timestamp_subsec_nanos()))
}

/// Convert ISO-8601 text to nanoseconds since the UNIX epoch.
///
/// A trailing `Z` is rewritten to `+00:00` before parsing.
pub fn iso_to_ns(text: &str) -> Result<i64> {
    let trimmed = text.trim();
    let normalized = match trimmed.strip_suffix('Z').or_else(|| trimmed.strip_suffix('z')) {
        Some(stem) => format!("{}+00:00", stem),
        None => trimmed.to_string(),
    };

    let instant = parse_iso8601(&normalized)?;
    let nanos = instant
        .timestamp_nanos_opt()
        .filter(|ns| *ns >= 0)
        .ok_or_else(|| ForwarderError::TimestampOutOfRange(text.to_string()))?;

    debug!("Parsed timestamp '{}' -> {} ns", text, nanos);
    Ok(nanos)
}

fn parse_iso8601(text: &str) -> Result<DateTime<Utc>> {
    let rfc3339_error = match DateTime::parse_from_rfc3339(text) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };

    for format in &OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in &NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    Err(ForwarderError::TimestampParse {
        value: text.to_string(),
        reason: rfc3339_error.to_string(),
    })
}
