//! HTTP date handling
//!
//! IMF-fixdate formatting and parsing (RFC 9110 section 5.6.7), second precision.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::SystemTime;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(IMF_FIXDATE).to_string()
}

/// Parse an HTTP date header value
///
/// Returns `None` for anything that is not an IMF-fixdate; callers treat that
/// the same as an absent header.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), IMF_FIXDATE)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Drop sub-second precision so comparisons match what a client echoes back
pub fn truncate_to_seconds(time: SystemTime) -> DateTime<Utc> {
    let dt = DateTime::<Utc>::from(time);
    DateTime::from_timestamp(dt.timestamp(), 0).unwrap_or(dt)
}
