//! Timestamp handling for the Synoptic API.
//!
//! Synoptic takes query bounds as fixed-width `YYYYMMDDHHmm` UTC tokens and
//! returns observation times as ISO 8601 strings. Both directions live here.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};

/// Error returned when an observation time cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid observation time: {value:?}")]
pub struct TimeError {
    value: String,
}

impl TimeError {
    fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

/// Format an instant as a Synoptic query timestamp.
///
/// The instant is converted to UTC and rendered as `YYYYMMDDHHmm`: 4-digit
/// year, then zero-padded month, day, hour (24h) and minute, no separators.
/// Instants before year 0 or after year 9999 clamp to `000001010000` and
/// `999912312359`, so the token is always 12 digits.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use synoptic_client::domain::format_timestamp;
///
/// let t = Utc.with_ymd_and_hms(2023, 3, 5, 7, 9, 0).unwrap();
/// assert_eq!(format_timestamp(&t), "202303050709");
/// ```
pub fn format_timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    let utc = instant.with_timezone(&Utc);
    if utc.year() < 0 {
        return "000001010000".to_string();
    }
    if utc.year() > 9999 {
        return "999912312359".to_string();
    }
    format!(
        "{:04}{:02}{:02}{:02}{:02}",
        utc.year(),
        utc.month(),
        utc.day(),
        utc.hour(),
        utc.minute()
    )
}

/// Parse an observation time from a Synoptic response.
///
/// Accepts RFC 3339 (`2023-03-05T07:00:00Z`), the `+0000` offset style, and
/// bare `2023-03-05T07:00:00` which is read as UTC (requests always ask for
/// `obtimezone=utc`).
pub fn parse_observation_time(s: &str) -> Result<DateTime<Utc>, TimeError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| TimeError::new(s))
}
