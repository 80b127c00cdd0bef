//! Date/time utilities for gator.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::{GatorError, Result};

/// Publication date format of RSS `pubDate` (RFC 1123 with a numeric zone).
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Display format used when listing posts.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp the way it is stored in the database.
///
/// The output is fixed width (microseconds, `Z` suffix) so that comparing
/// the stored strings orders them chronologically.
pub fn to_db_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a datetime string read from the database.
pub fn parse_db_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

/// `PUB_DATE_FORMAT` without the leading weekday.
const PUB_DATE_BODY_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Parse an RSS `pubDate` such as `Mon, 02 Jan 2006 15:04:05 -0700`.
///
/// The weekday must be a valid abbreviation but is not checked against the
/// date; feeds with a wrong weekday still get their real publish instant.
pub fn parse_pub_date(raw: &str) -> Result<DateTime<Utc>> {
    let invalid = |reason: &dyn std::fmt::Display| {
        GatorError::Validation(format!("invalid publication date {raw:?}: {reason}"))
    };

    let body = match raw.trim().split_once(", ") {
        Some((day, body)) if WEEKDAYS.contains(&day) => body,
        _ => return Err(invalid(&"missing weekday")),
    };

    DateTime::parse_from_str(body, PUB_DATE_BODY_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid(&e))
}

/// Render a timestamp as an RSS `pubDate`.
pub fn to_pub_date(dt: &DateTime<Utc>) -> String {
    dt.format(PUB_DATE_FORMAT).to_string()
}

/// Format a timestamp for terminal output.
pub fn format_display(dt: &DateTime<Utc>) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}
