//! Timestamp and id helpers shared by the store, seed and views.
//!
//! Timestamps are kept as ISO-8601 strings in the document (that is what
//! exported files carry); these helpers are the only place they are produced
//! or parsed.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

/// Current wall-clock time
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as `2024-05-01T12:00:00.000Z`
pub fn to_iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_iso() -> String {
    to_iso(now())
}

/// ISO timestamp `days` before `now` (negative values land in the future)
pub fn days_ago(now: DateTime<Utc>, days: i64) -> String {
    to_iso(now - Duration::days(days))
}

/// Parse either a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Calendar date of a stored timestamp or due date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_instant(value).map(|at| at.date_naive())
}

/// Generate a fresh entity id (UUID v4)
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
