//! UTC → local-zone conversion for display.
//!
//! Stored instants stay UTC; conversion happens once, at the presentation
//! edge, honoring the DST rules in effect at that date.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Convert a stored UTC instant into the given IANA zone.
pub fn to_local(utc: DateTime<Utc>, zone: Tz) -> DateTime<Tz> {
    utc.with_timezone(&zone)
}

/// Format an instant the way the conditions panel and tables show it.
pub fn format_local(utc: DateTime<Utc>, zone: Tz) -> String {
    to_local(utc, zone).format("%Y-%m-%d %H:%M %Z").to_string()
}
