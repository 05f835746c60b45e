//! Consistency, streak, and daily-average computation.
//!
//! All three figures are derived from one participant's daily entries after
//! the same filter: rest days are excluded, and so is the current local day,
//! which is still in progress and cannot be judged complete.
//!
//! Two different thresholds apply. A day counts toward the consistency
//! percentage at half the daily target with acceptable accuracy; a day only
//! extends a streak at the full target. The asymmetry is deliberate.

use chrono::NaiveDate;
use serde::Serialize;

use crate::day::{is_rest_day, next_active_day, today_local};
use crate::stats::scoring::accuracy;
use crate::types::DayEntry;

/// Questions per day for a streak-qualifying day.
pub const DAILY_TARGET: i64 = 200;

/// Minimum accuracy percentage for a day to count toward consistency.
pub const MIN_ACCURACY_TARGET: f64 = 70.0;

/// Fraction of [`DAILY_TARGET`] that a consistency day must reach.
pub const CONSISTENCY_TARGET_FRACTION: f64 = 0.5;

/// Derived consistency and streak figures for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ConsistencyResult {
    /// Percentage of scored days meeting the consistency threshold, [0, 100]
    pub consistency: f64,
    /// Current unbroken run of qualifying days, counted backward
    pub streak: i64,
    /// Longest qualifying run on record
    pub longest_streak: i64,
}

/// Rest days and today removed, remainder sorted chronologically.
fn scored_days(entries: &[DayEntry], today: NaiveDate) -> Vec<DayEntry> {
    let mut days: Vec<DayEntry> = entries
        .iter()
        .filter(|e| !is_rest_day(e.date) && e.date != today)
        .copied()
        .collect();
    days.sort_by_key(|e| e.date);
    days
}

fn meets_consistency(entry: &DayEntry) -> bool {
    entry.completed as f64 >= CONSISTENCY_TARGET_FRACTION * DAILY_TARGET as f64
        && accuracy(entry.correct, entry.completed) >= MIN_ACCURACY_TARGET
}

fn qualifies_for_streak(entry: &DayEntry) -> bool {
    entry.completed >= DAILY_TARGET
}

/// Two qualifying days are streak-adjacent when advancing one calendar day
/// at a time from the earlier one, skipping rest days, lands exactly on the
/// later one.
fn streak_adjacent(earlier: NaiveDate, later: NaiveDate) -> bool {
    next_active_day(earlier) == later
}

/// Compute `{consistency, streak, longest_streak}` for one participant.
///
/// The entry list may arrive unsorted and with absent days; missing dates
/// are gaps, not zeros. Empty or fully filtered input produces the
/// all-zero result.
pub fn resolve_consistency_and_streak(entries: &[DayEntry]) -> ConsistencyResult {
    resolve_consistency_and_streak_at(entries, today_local())
}

/// As [`resolve_consistency_and_streak`], with an explicit "today" so that
/// callers replaying historical snapshots get identical results.
pub fn resolve_consistency_and_streak_at(
    entries: &[DayEntry],
    today: NaiveDate,
) -> ConsistencyResult {
    let days = scored_days(entries, today);
    if days.is_empty() {
        return ConsistencyResult::default();
    }

    let consistent = days.iter().filter(|e| meets_consistency(e)).count();
    let consistency = (consistent as f64 / days.len() as f64 * 10_000.0).round() / 100.0;

    // Longest streak: forward scan. A non-qualifying day or a date gap
    // resets the run; a rest-day hole does not.
    let mut longest = 0i64;
    let mut run = 0i64;
    let mut prev_qualifying: Option<NaiveDate> = None;
    for entry in &days {
        if qualifies_for_streak(entry) {
            run = match prev_qualifying {
                Some(prev) if streak_adjacent(prev, entry.date) => run + 1,
                _ => 1,
            };
            prev_qualifying = Some(entry.date);
            longest = longest.max(run);
        } else {
            run = 0;
            prev_qualifying = None;
        }
    }

    // Current streak: backward scan anchored at the most recent scored day.
    // If that day does not qualify there is no current streak.
    let mut streak = 0i64;
    if days.last().map(qualifies_for_streak) == Some(true) {
        streak = 1;
        for pair in days.windows(2).rev() {
            let (earlier, later) = (&pair[0], &pair[1]);
            if qualifies_for_streak(earlier) && streak_adjacent(earlier.date, later.date) {
                streak += 1;
            } else {
                break;
            }
        }
    }

    ConsistencyResult {
        consistency,
        streak,
        longest_streak: longest,
    }
}

/// Mean `completed` per scored day, rounded to the nearest whole question.
///
/// Uses the same rest-day-and-today filter as the consistency engine.
/// Returns 0 when nothing is left to average.
pub fn daily_average(entries: &[DayEntry]) -> i64 {
    daily_average_at(entries, today_local())
}

/// As [`daily_average`], with an explicit "today".
pub fn daily_average_at(entries: &[DayEntry], today: NaiveDate) -> i64 {
    let days = scored_days(entries, today);
    if days.is_empty() {
        return 0;
    }
    let total: i64 = days.iter().map(|e| e.completed).sum();
    (total as f64 / days.len() as f64).round() as i64
}
