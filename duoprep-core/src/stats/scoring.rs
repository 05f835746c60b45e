//! Accuracy and points scoring for the head-to-head leaderboard.

use serde::Serialize;

use crate::types::Participant;

/// Accuracy above this percentage earns bonus points.
pub const BONUS_ACCURACY_THRESHOLD: f64 = 80.0;

/// Derived accuracy and leaderboard points for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Percentage in [0, 100], two decimal places
    pub accuracy: f64,
    /// Volume plus accuracy bonus; never less than `completed`
    pub points: i64,
}

/// Accuracy percentage rounded to two decimal places.
///
/// Zero completed means zero accuracy, never a division error.
pub fn accuracy(correct: i64, completed: i64) -> f64 {
    if completed <= 0 {
        return 0.0;
    }
    (correct as f64 / completed as f64 * 10_000.0).round() / 100.0
}

/// Turn raw counts into `{accuracy, points}`.
///
/// Points equal completed volume, plus a bonus of two percentage points of
/// volume for every accuracy point above 80%. Below the threshold accuracy
/// has no scoring effect: points are a volume floor, not a penalty curve.
pub fn compute_metrics(completed: i64, correct: i64) -> Metrics {
    let accuracy = accuracy(correct, completed);

    let points = if accuracy >= BONUS_ACCURACY_THRESHOLD {
        let bonus = (accuracy - BONUS_ACCURACY_THRESHOLD) * 2.0;
        (completed as f64 + bonus * completed as f64 / 100.0).round() as i64
    } else {
        completed
    };

    Metrics { accuracy, points }
}

/// Head-to-head winner by points.
///
/// Ties go to the second participant in comparison order. This is the
/// documented tie-break, stable across runs, not an oversight.
pub fn head_to_head(one: &Metrics, two: &Metrics) -> Participant {
    if one.points > two.points {
        Participant::One
    } else {
        Participant::Two
    }
}
