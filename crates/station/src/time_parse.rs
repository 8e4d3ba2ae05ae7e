//! Loose date-string parsing for sensor posts and query bounds.
//!
//! The wire format is a digit string, optionally dash-separated, whose length
//! selects the layout. Anything unrecognized parses to `None`; callers fall
//! back to their own default instead of failing the request.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse a loosely-formatted date string into a UTC instant.
///
/// Supported layouts by length:
/// `YYYY`, `YYYYMM`, `YYYYMMDD`, `YYYY-MM-DD` / `YYYYMMDDHH` (dashed form
/// tried first), `YYYYMMDDHHMM`, `YYYY-MM-DD-HH`, `YYYYMMDDHHMMSS`,
/// `YYYY-MM-DD-HH-MM`, `YYYY-MM-DD-HH-MM-SS`.
pub fn parse_date_str(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    let naive = match text.len() {
        4 | 6 | 8 | 12 | 14 => parse_compact(text),
        10 => parse_dashed(text, 3).or_else(|| parse_compact(text)),
        13 => parse_dashed(text, 4),
        16 => parse_dashed(text, 5),
        19 => parse_dashed(text, 6),
        _ => None,
    };
    naive.map(|n| n.and_utc())
}

/// Fixed-width digit layout: YYYY[MM[DD[HH[MM[SS]]]]].
fn parse_compact(text: &str) -> Option<NaiveDateTime> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = text.get(0..4)?.parse().ok()?;
    let month: u32 = opt_component(text, 4)?.unwrap_or(1);
    let day: u32 = opt_component(text, 6)?.unwrap_or(1);
    let hour: u32 = opt_component(text, 8)?.unwrap_or(0);
    let minute: u32 = opt_component(text, 10)?.unwrap_or(0);
    let second: u32 = opt_component(text, 12)?.unwrap_or(0);

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Two-digit component starting at `at`, or `Some(None)` when the string ends
/// before it. Outer `None` means the digits were present but unparseable.
fn opt_component(text: &str, at: usize) -> Option<Option<u32>> {
    match text.get(at..at + 2) {
        Some(part) => part.parse().ok().map(Some),
        None => Some(None),
    }
}

/// Dash-separated layout: Y-M-D with optional trailing -H[-M[-S]] parts.
/// The part count must match the layout selected by the input length.
fn parse_dashed(text: &str, parts_expected: usize) -> Option<NaiveDateTime> {
    let parts: Vec<&str> = text.split('-').collect();
    if parts.len() != parts_expected {
        return None;
    }

    let year: i32 = parts[0].parse().ok()?;
    let num = |i: usize| -> Option<u32> { parts.get(i).and_then(|p| p.parse().ok()) };

    let month = num(1)?;
    let day = num(2)?;
    let hour = if parts_expected > 3 { num(3)? } else { 0 };
    let minute = if parts_expected > 4 { num(4)? } else { 0 };
    let second = if parts_expected > 5 { num(5)? } else { 0 };

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}
