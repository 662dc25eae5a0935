//! # Date Handling Utilities
//!
//! Parsing of the timestamp shapes accepted by calendar tools.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A parsed event timestamp.
///
/// Offset-qualified and local timestamps are not comparable with each other:
/// a local timestamp is wall-clock time in a zone the caller did not state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTimestamp {
    /// Carried an offset; stored in UTC.
    Absolute(NaiveDateTime),
    /// Had no offset.
    Local(NaiveDateTime),
}

impl PartialOrd for EventTimestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (EventTimestamp::Absolute(left), EventTimestamp::Absolute(right))
            | (EventTimestamp::Local(left), EventTimestamp::Local(right)) => left.partial_cmp(right),
            _ => None,
        }
    }
}

/// Parses an event timestamp.
///
/// Accepts RFC3339 timestamps (`2025-03-01T09:30:00Z`,
/// `2025-03-01T09:30:00+01:00`) and local timestamps without an offset
/// (`2025-03-01T09:30:00`). Offset timestamps are converted to UTC.
///
/// # Example
/// ```rust
/// use voiceforge_util::parse_event_timestamp;
///
/// assert!(parse_event_timestamp("2025-03-01T09:30:00Z").is_some());
/// assert!(parse_event_timestamp("2025-03-01T09:30:00").is_some());
/// assert!(parse_event_timestamp("tomorrow at nine").is_none());
/// ```
pub fn parse_event_timestamp(value: &str) -> Option<EventTimestamp> {
    let trimmed = value.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(EventTimestamp::Absolute(date_time.naive_utc()));
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(EventTimestamp::Local)
}

/// Returns `true` when `value` is a `YYYY-MM-DD` calendar date.
pub fn is_calendar_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_ok()
}

/// Returns `true` when `value` is a timestamp or a plain calendar date.
///
/// Range filters on list endpoints accept either form.
pub fn is_date_or_timestamp(value: &str) -> bool {
    is_calendar_date(value) || parse_event_timestamp(value).is_some()
}
