//! Time-of-day bucketing for the hourly chart and the clock-face view.
//!
//! Events from every calendar day are folded onto a single 24-hour cycle on
//! the tracker clock. Two resolutions are served: 24 one-hour buckets for
//! the clock face and 8 three-hour buckets for the interval list.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::day::local_hour_minute;
use crate::types::ActivityEvent;

/// Bucket width for time-of-day aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketGranularity {
    /// 24 one-hour buckets
    Hourly,
    /// 8 three-hour buckets
    ThreeHour,
}

impl BucketGranularity {
    pub fn slot_count(&self) -> usize {
        match self {
            BucketGranularity::Hourly => 24,
            BucketGranularity::ThreeHour => 8,
        }
    }

    pub fn hours_per_slot(&self) -> u32 {
        match self {
            BucketGranularity::Hourly => 1,
            BucketGranularity::ThreeHour => 3,
        }
    }

    fn slot_for_hour(&self, hour: u32) -> usize {
        (hour / self.hours_per_slot()) as usize
    }
}

/// Aggregate for one time-of-day slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    /// Display label, e.g. "2pm" or "12pm–3pm"
    pub label: String,
    /// First hour of the slot (0-23)
    pub start_hour: u32,
    /// Percentage in [0, 100], one decimal place; 0 for an empty bucket
    pub accuracy: f64,
    pub total_questions: i64,
    pub total_correct: i64,
    /// Number of events that landed in this slot
    pub session_count: i64,
}

/// Full time-of-day aggregation for one granularity.
///
/// Every slot of the grid is present, zero-valued when empty, so the chart
/// layer can render a complete cycle and skip silent slots itself.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeOfDayStats {
    pub buckets: Vec<TimeBucket>,
    /// Mean accuracy across buckets with activity, one decimal place
    pub average_accuracy: f64,
    /// Bucket with the highest accuracy (first encountered wins ties)
    pub peak: Option<TimeBucket>,
    /// Bucket with the lowest non-zero accuracy (first encountered wins ties)
    pub low: Option<TimeBucket>,
}

fn hour_label(hour: u32) -> String {
    let h = hour % 12;
    let h = if h == 0 { 12 } else { h };
    let period = if hour % 24 < 12 { "am" } else { "pm" };
    format!("{}{}", h, period)
}

fn slot_label(granularity: BucketGranularity, slot: usize) -> String {
    let start = slot as u32 * granularity.hours_per_slot();
    match granularity {
        BucketGranularity::Hourly => hour_label(start),
        BucketGranularity::ThreeHour => {
            let end = (start + granularity.hours_per_slot()) % 24;
            format!("{}–{}", hour_label(start), hour_label(end))
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Partition events into fixed time-of-day buckets and derive per-bucket and
/// global statistics.
///
/// Every event lands in exactly one bucket; nothing is dropped or double
/// counted. Empty input yields a full grid of zero buckets with no peak or
/// low slot.
pub fn bucket_by_time_of_day(
    events: &[ActivityEvent],
    granularity: BucketGranularity,
) -> TimeOfDayStats {
    let slots = granularity.slot_count();
    let mut buckets: Vec<TimeBucket> = (0..slots)
        .map(|slot| TimeBucket {
            label: slot_label(granularity, slot),
            start_hour: slot as u32 * granularity.hours_per_slot(),
            accuracy: 0.0,
            total_questions: 0,
            total_correct: 0,
            session_count: 0,
        })
        .collect();

    for event in events {
        let (hour, _) = local_hour_minute(event.occurred_at);
        let slot = granularity.slot_for_hour(hour);
        let bucket = &mut buckets[slot];
        bucket.total_questions += event.completed;
        bucket.total_correct += event.correct;
        bucket.session_count += 1;
    }

    for bucket in &mut buckets {
        if bucket.total_questions > 0 {
            bucket.accuracy =
                round1(bucket.total_correct as f64 / bucket.total_questions as f64 * 100.0);
        }
    }

    let active: Vec<&TimeBucket> = buckets.iter().filter(|b| b.total_questions > 0).collect();
    let average_accuracy = if active.is_empty() {
        0.0
    } else {
        round1(active.iter().map(|b| b.accuracy).sum::<f64>() / active.len() as f64)
    };

    // First encountered wins ties: strict comparisons while scanning in
    // slot order.
    let mut peak: Option<TimeBucket> = None;
    for bucket in &active {
        if peak.as_ref().map_or(true, |p| bucket.accuracy > p.accuracy) {
            peak = Some((*bucket).clone());
        }
    }

    let mut low: Option<TimeBucket> = None;
    for bucket in buckets.iter().filter(|b| b.accuracy > 0.0) {
        if low.as_ref().map_or(true, |l| bucket.accuracy < l.accuracy) {
            low = Some(bucket.clone());
        }
    }

    TimeOfDayStats {
        buckets,
        average_accuracy,
        peak,
        low,
    }
}

/// Angle in degrees for a clock-face marker: 15° per hour, 0.25° per
/// minute, rotated so hour zero sits at the 12 o'clock position.
pub fn clock_position_degrees(hour: u32, minute: u32) -> f64 {
    (hour as f64 * 15.0 + minute as f64 * 0.25) - 90.0
}

/// Clock-face angle for a timestamp, on the tracker clock.
pub fn clock_angle(ts: DateTime<Utc>) -> f64 {
    let (hour, minute) = local_hour_minute(ts);
    clock_position_degrees(hour, minute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Participant;
    use chrono::TimeZone;

    /// Event at the given hour/minute on the tracker clock.
    fn event_at_local(id: i64, hour: u32, minute: u32, completed: i64, correct: i64) -> ActivityEvent {
        let local = crate::day::local_offset()
            .with_ymd_and_hms(2025, 6, 2, hour, minute, 0)
            .unwrap();
        ActivityEvent {
            id,
            participant: Participant::One,
            completed,
            correct,
            occurred_at: local.with_timezone(&Utc),
            created_at: local.with_timezone(&Utc),
        }
    }

    #[test]
    fn test_empty_input_keeps_full_grid() {
        let stats = bucket_by_time_of_day(&[], BucketGranularity::Hourly);
        assert_eq!(stats.buckets.len(), 24);
        assert!(stats.buckets.iter().all(|b| b.total_questions == 0));
        assert_eq!(stats.average_accuracy, 0.0);
        assert!(stats.peak.is_none());
        assert!(stats.low.is_none());

        let stats = bucket_by_time_of_day(&[], BucketGranularity::ThreeHour);
        assert_eq!(stats.buckets.len(), 8);
    }

    #[test]
    fn test_events_clustered_in_one_afternoon_slot() {
        // All events in hour 14 with three-hour buckets land in 12pm–3pm.
        let events = [
            event_at_local(1, 14, 5, 60, 50),
            event_at_local(2, 14, 30, 40, 30),
            event_at_local(3, 14, 55, 100, 80),
        ];
        let stats = bucket_by_time_of_day(&events, BucketGranularity::ThreeHour);

        let slot = &stats.buckets[4]; // hours 12-14
        assert_eq!(slot.label, "12pm–3pm");
        assert_eq!(slot.total_questions, 200);
        assert_eq!(slot.total_correct, 160);
        assert_eq!(slot.session_count, 3);
        assert_eq!(slot.accuracy, 80.0);

        for (i, bucket) in stats.buckets.iter().enumerate() {
            if i != 4 {
                assert_eq!(bucket.total_questions, 0, "slot {}", i);
                assert_eq!(bucket.accuracy, 0.0, "slot {}", i);
            }
        }
    }

    #[test]
    fn test_no_event_dropped_or_double_counted() {
        let events: Vec<ActivityEvent> = (0..24)
            .map(|h| event_at_local(h as i64, h, 10, 10 + h as i64, 5))
            .collect();
        let total_completed: i64 = events.iter().map(|e| e.completed).sum();

        let stats = bucket_by_time_of_day(&events, BucketGranularity::Hourly);
        let bucketed: i64 = stats.buckets.iter().map(|b| b.total_questions).sum();
        assert_eq!(bucketed, total_completed);

        let sessions: i64 = stats.buckets.iter().map(|b| b.session_count).sum();
        assert_eq!(sessions, 24);
    }

    #[test]
    fn test_peak_and_low_selection() {
        let events = [
            event_at_local(1, 6, 0, 100, 90),  // 90.0
            event_at_local(2, 10, 0, 100, 40), // 40.0
            event_at_local(3, 20, 0, 100, 90), // 90.0, ties with hour 6
        ];
        let stats = bucket_by_time_of_day(&events, BucketGranularity::Hourly);

        let peak = stats.peak.expect("peak bucket");
        assert_eq!(peak.start_hour, 6); // first encountered wins the tie
        let low = stats.low.expect("low bucket");
        assert_eq!(low.start_hour, 10);

        // Mean of 90.0, 40.0, 90.0.
        assert_eq!(stats.average_accuracy, 73.3);
    }

    #[test]
    fn test_bucket_accuracy_one_decimal() {
        let events = [event_at_local(1, 9, 0, 3, 2)];
        let stats = bucket_by_time_of_day(&events, BucketGranularity::Hourly);
        assert_eq!(stats.buckets[9].accuracy, 66.7);
    }

    #[test]
    fn test_clock_position() {
        assert_eq!(clock_position_degrees(6, 0), 0.0);
        assert_eq!(clock_position_degrees(0, 0), -90.0);
        assert_eq!(clock_position_degrees(12, 0), 90.0);
        assert_eq!(clock_position_degrees(18, 0), 180.0);
        assert_eq!(clock_position_degrees(14, 30), 127.5);
        // Minute resolution must stay exact.
        assert_eq!(clock_position_degrees(0, 1), -89.75);
    }

    #[test]
    fn test_clock_angle_uses_tracker_clock() {
        // 09:00 UTC is 14:30 on the tracker clock.
        let ts = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        assert_eq!(clock_angle(ts), 127.5);
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(hour_label(0), "12am");
        assert_eq!(hour_label(11), "11am");
        assert_eq!(hour_label(12), "12pm");
        assert_eq!(hour_label(23), "11pm");
        assert_eq!(slot_label(BucketGranularity::ThreeHour, 7), "9pm–12am");
    }
}
