//! Local-day and rest-day resolution.
//!
//! The tracker runs on a fixed UTC+5:30 clock regardless of where either
//! participant happens to be. Every date-bucketing decision in the stats
//! engine routes through this module so the offset is applied exactly once
//! per computation; nothing else in the crate may convert timestamps to
//! calendar days on its own.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Timelike, Utc, Weekday};

/// Fixed tracker offset from UTC, in seconds (+05:30).
pub const LOCAL_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The fixed tracker offset as a chrono type.
pub fn local_offset() -> FixedOffset {
    // LOCAL_OFFSET_SECS is well inside chrono's valid range
    FixedOffset::east_opt(LOCAL_OFFSET_SECS).unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
}

/// Convert an absolute timestamp to its local calendar day.
pub fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&local_offset()).date_naive()
}

/// Local calendar day as a `YYYY-MM-DD` key.
pub fn local_day_key(ts: DateTime<Utc>) -> String {
    local_day(ts).format("%Y-%m-%d").to_string()
}

/// Hour and minute of the timestamp on the tracker clock.
pub fn local_hour_minute(ts: DateTime<Utc>) -> (u32, u32) {
    let local = ts.with_timezone(&local_offset());
    (local.hour(), local.minute())
}

/// Today's local calendar day.
pub fn today_local() -> NaiveDate {
    local_day(Utc::now())
}

/// Whether a local day is the weekly rest day (Sunday).
///
/// Rest days are excluded from averages and consistency, and skipped over
/// when testing streak adjacency.
pub fn is_rest_day(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

/// The next day that counts, stepping one calendar day forward and skipping
/// rest days.
pub fn next_active_day(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while is_rest_day(next) {
        next += Duration::days(1);
    }
    next
}

/// The previous day that counts, stepping one calendar day backward and
/// skipping rest days.
pub fn prev_active_day(date: NaiveDate) -> NaiveDate {
    let mut prev = date - Duration::days(1);
    while is_rest_day(prev) {
        prev -= Duration::days(1);
    }
    prev
}
