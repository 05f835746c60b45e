//! Stats engine for duoprep
//!
//! Pure, synchronous computation over snapshots fetched by the caller:
//! - Consistency percentage, current streak, and longest streak
//! - Daily averages with rest-day and in-progress-day exclusion
//! - Time-of-day bucketing for the hourly chart and clock face
//! - Accuracy/points scoring and the head-to-head leader
//! - Motivational-message selection for the race banner
//!
//! Nothing in this module performs I/O or holds state; every function can
//! be re-run on each poll tick and returns identical results for identical
//! snapshots.

pub mod buckets;
pub mod consistency;
pub mod message;
pub mod scoring;

pub use buckets::{
    bucket_by_time_of_day, clock_angle, clock_position_degrees, BucketGranularity, TimeBucket,
    TimeOfDayStats,
};
pub use consistency::{
    daily_average, daily_average_at, resolve_consistency_and_streak,
    resolve_consistency_and_streak_at, ConsistencyResult, CONSISTENCY_TARGET_FRACTION,
    DAILY_TARGET, MIN_ACCURACY_TARGET,
};
pub use message::select_motivational_message;
pub use scoring::{accuracy, compute_metrics, head_to_head, Metrics, BONUS_ACCURACY_THRESHOLD};
