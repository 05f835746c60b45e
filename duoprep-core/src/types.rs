//! Core domain types for duoprep
//!
//! These types normalize the three read shapes served by the remote row
//! store into the canonical model the stats engine consumes.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Participant** | One of exactly two tracked people (`user1` / `user2` on the wire) |
//! | **ActivityEvent** | A single logged submission with completed/correct counts |
//! | **DailyRollup** | Per-calendar-day additive totals for both participants |
//! | **DayEntry** | One participant's figures for one local day, used by the stats engine |
//! | **CumulativePair** | All-time running totals for both participants |
//!
//! The tracker is deliberately hard-coded to two participants; there is no
//! participant registry and no multi-tenant support.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One of the two tracked participants.
///
/// The wire format uses `user1` / `user2`; code always works with this enum
/// so that call sites select the participant explicitly instead of probing
/// for field presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Participant {
    #[serde(rename = "user1")]
    One,
    #[serde(rename = "user2")]
    Two,
}

impl Participant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Participant::One => "user1",
            Participant::Two => "user2",
        }
    }

    /// The other participant in the pair.
    pub fn other(&self) -> Participant {
        match self {
            Participant::One => Participant::Two,
            Participant::Two => Participant::One,
        }
    }
}

impl std::str::FromStr for Participant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user1" | "1" | "one" => Ok(Participant::One),
            "user2" | "2" | "two" => Ok(Participant::Two),
            _ => Err(format!("unknown participant: {}", s)),
        }
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single logged submission.
///
/// Events are immutable once accepted; the core never mutates or deletes
/// them. `occurred_at` is when the practice happened, `created_at` is when
/// the row was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Row identifier assigned by the store (monotonic)
    pub id: i64,
    /// Which participant logged this event
    #[serde(rename = "user_type")]
    pub participant: Participant,
    /// Questions attempted (always > 0 for an accepted event)
    pub completed: i64,
    /// Questions answered correctly (0 <= correct <= completed)
    pub correct: i64,
    /// When the practice occurred
    #[serde(rename = "timestamp")]
    pub occurred_at: DateTime<Utc>,
    /// When the row was created
    pub created_at: DateTime<Utc>,
}

/// One participant's figures for one local calendar day.
///
/// The participant is carried explicitly so the engine never infers
/// ownership from which fields happen to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayEntry {
    pub participant: Participant,
    pub date: NaiveDate,
    pub completed: i64,
    pub correct: i64,
}

/// Additive per-day totals for both participants.
///
/// At most one rollup exists per local day; totals only ever grow as events
/// for that day accumulate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRollup {
    /// Local calendar day (see [`crate::day`])
    pub date: NaiveDate,
    pub user1_completed: i64,
    pub user1_correct: i64,
    pub user2_completed: i64,
    pub user2_correct: i64,
}

impl DailyRollup {
    /// Empty rollup for a day with no activity yet.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            user1_completed: 0,
            user1_correct: 0,
            user2_completed: 0,
            user2_correct: 0,
        }
    }

    /// Extract one participant's side as a [`DayEntry`].
    pub fn entry_for(&self, participant: Participant) -> DayEntry {
        let (completed, correct) = match participant {
            Participant::One => (self.user1_completed, self.user1_correct),
            Participant::Two => (self.user2_completed, self.user2_correct),
        };
        DayEntry {
            participant,
            date: self.date,
            completed,
            correct,
        }
    }

    /// Add a submission to this rollup.
    pub fn add(&mut self, participant: Participant, completed: i64, correct: i64) {
        match participant {
            Participant::One => {
                self.user1_completed += completed;
                self.user1_correct += correct;
            }
            Participant::Two => {
                self.user2_completed += completed;
                self.user2_correct += correct;
            }
        }
    }
}

/// All-time running totals for one participant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantTotals {
    pub completed: i64,
    pub correct: i64,
    /// Display name as stored remotely
    pub name: String,
}

/// Cumulative totals for both participants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CumulativePair {
    pub user1: ParticipantTotals,
    pub user2: ParticipantTotals,
}

impl CumulativePair {
    pub fn totals_for(&self, participant: Participant) -> &ParticipantTotals {
        match participant {
            Participant::One => &self.user1,
            Participant::Two => &self.user2,
        }
    }

    pub fn totals_for_mut(&mut self, participant: Participant) -> &mut ParticipantTotals {
        match participant {
            Participant::One => &mut self.user1,
            Participant::Two => &mut self.user2,
        }
    }
}

/// One participant's progress toward the shared race target.
///
/// `previous` is the value from the prior snapshot, when the caller has one;
/// the message selector uses it to detect overtakes.
#[derive(Debug, Clone)]
pub struct ProgressPoint {
    pub name: String,
    pub current: i64,
    pub previous: Option<i64>,
}

/// Reject a submission that violates the count invariants.
///
/// `completed` must be positive and `correct` must lie in
/// `[0, completed]`. Violations are surfaced to the caller; nothing is
/// clamped and nothing reaches the store.
pub fn validate_submission(completed: i64, correct: i64) -> crate::Result<()> {
    if completed <= 0 {
        return Err(crate::Error::InvalidSubmission(format!(
            "completed must be positive, got {}",
            completed
        )));
    }
    if correct < 0 {
        return Err(crate::Error::InvalidSubmission(format!(
            "correct must be non-negative, got {}",
            correct
        )));
    }
    if correct > completed {
        return Err(crate::Error::InvalidSubmission(format!(
            "correct ({}) exceeds completed ({})",
            correct, completed
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_participant_roundtrip() {
        assert_eq!("user1".parse::<Participant>().unwrap(), Participant::One);
        assert_eq!("user2".parse::<Participant>().unwrap(), Participant::Two);
        assert!("user3".parse::<Participant>().is_err());
        assert_eq!(Participant::One.other(), Participant::Two);
        assert_eq!(Participant::Two.other(), Participant::One);
    }

    #[test]
    fn test_rollup_add_and_entry() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut rollup = DailyRollup::empty(date);
        rollup.add(Participant::One, 120, 96);
        rollup.add(Participant::One, 80, 60);
        rollup.add(Participant::Two, 50, 45);

        let one = rollup.entry_for(Participant::One);
        assert_eq!(one.completed, 200);
        assert_eq!(one.correct, 156);
        assert_eq!(one.date, date);

        let two = rollup.entry_for(Participant::Two);
        assert_eq!(two.completed, 50);
        assert_eq!(two.correct, 45);
    }

    #[test]
    fn test_validate_submission() {
        assert!(validate_submission(100, 70).is_ok());
        assert!(validate_submission(1, 0).is_ok());
        assert!(validate_submission(1, 1).is_ok());

        // Zero-completed submissions are rejected, not stored as zeros.
        assert!(validate_submission(0, 0).is_err());
        assert!(validate_submission(-5, 0).is_err());
        assert!(validate_submission(10, -1).is_err());
        assert!(validate_submission(10, 11).is_err());
    }

    #[test]
    fn test_event_wire_shape() {
        let json = r#"{
            "id": 42,
            "user_type": "user1",
            "completed": 180,
            "correct": 150,
            "timestamp": "2025-06-02T15:30:00Z",
            "created_at": "2025-06-02T15:30:05Z"
        }"#;
        let event: ActivityEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, 42);
        assert_eq!(event.participant, Participant::One);
        assert_eq!(event.completed, 180);
    }
}
