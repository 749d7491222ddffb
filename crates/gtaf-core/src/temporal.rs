//! Timestamp parsing and validity-window checks.
//!
//! Windows are half-open: `valid_from <= now < valid_until`. A bound that is
//! missing or cannot be parsed closes the window.

use chrono::{DateTime, Utc};

/// Parse an ISO-8601 / RFC 3339 timestamp into UTC.
///
/// A trailing `Z` is rewritten to `+00:00` before parsing. Timestamps
/// without any offset are rejected: the gate never guesses a timezone.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.strip_suffix(['Z', 'z']) {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// True if `now` falls in `[valid_from, valid_until)`.
pub fn window_contains(valid_from: DateTime<Utc>, valid_until: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    valid_from <= now && now < valid_until
}

/// Window check over raw string bounds. Fails closed on missing or
/// unparseable input.
pub fn within_window(valid_from: Option<&str>, valid_until: Option<&str>, now: DateTime<Utc>) -> bool {
    match (
        valid_from.and_then(parse_timestamp),
        valid_until.and_then(parse_timestamp),
    ) {
        (Some(from), Some(until)) => window_contains(from, until, now),
        _ => false,
    }
}
