use crate::{CoreError, Result as CoreErrorResult};

use std::panic::Location;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use error_location::ErrorLocation;

/// Parse a timestamp as sent by the marketplace backend.
///
/// Accepted forms:
/// - RFC 3339 (`2024-05-01T10:00:00Z`, `2024-05-01T10:00:00+07:00`)
/// - zone-less local date time (`2024-05-01T10:00:00.123`), read as UTC
/// - epoch milliseconds (`1714557600000`)
#[track_caller]
pub fn parse_timestamp(value: &str) -> CoreErrorResult<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = trimmed.parse::<NaiveDateTime>() {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if let Ok(millis) = trimmed.parse::<i64>()
        && let Some(parsed) = from_millis(millis)
    {
        return Ok(parsed);
    }

    Err(CoreError::InvalidTimestamp {
        value: value.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Epoch milliseconds to UTC, `None` when out of range
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
