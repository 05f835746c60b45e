//! Motivational-message selection for the head-to-head race banner.
//!
//! Scenario conditions overlap (a 4% gap is also a half-done race), so the
//! rules live in one ordered table and the first match wins. Reordering the
//! table changes behavior; the precedence below is the contract.

use crate::types::ProgressPoint;

/// Everything the rule predicates and templates need, computed once.
struct Race<'a> {
    one: &'a ProgressPoint,
    two: &'a ProgressPoint,
    target: i64,
}

impl<'a> Race<'a> {
    fn pct(&self, p: &ProgressPoint) -> f64 {
        if self.target <= 0 {
            return 0.0;
        }
        p.current as f64 / self.target as f64 * 100.0
    }

    fn gap(&self) -> i64 {
        (self.one.current - self.two.current).abs()
    }

    fn gap_pct(&self) -> f64 {
        if self.target <= 0 {
            return 0.0;
        }
        self.gap() as f64 / self.target as f64 * 100.0
    }

    /// Whoever is ahead right now; ties never reach leader-based rules.
    fn leader(&self) -> &'a ProgressPoint {
        if self.one.current >= self.two.current {
            self.one
        } else {
            self.two
        }
    }

    fn trailer(&self) -> &'a ProgressPoint {
        if self.one.current >= self.two.current {
            self.two
        } else {
            self.one
        }
    }

    fn remaining(&self, p: &ProgressPoint) -> i64 {
        (self.target - p.current).max(0)
    }

    /// True when the previous snapshot had the opposite leader.
    fn leader_flipped(&self) -> bool {
        let (Some(prev_one), Some(prev_two)) = (self.one.previous, self.two.previous) else {
            return false;
        };
        if prev_one == prev_two || self.one.current == self.two.current {
            return false;
        }
        let was_one_ahead = prev_one > prev_two;
        let is_one_ahead = self.one.current > self.two.current;
        was_one_ahead != is_one_ahead
    }
}

struct MessageRule {
    applies: fn(&Race) -> bool,
    render: fn(&Race) -> String,
}

/// Scenario table in precedence order. First match wins.
const RULES: &[MessageRule] = &[
    // Both reached the target
    MessageRule {
        applies: |r| r.one.current >= r.target && r.two.current >= r.target,
        render: |r| {
            format!(
                "{} and {} have both crossed {} questions. Incredible finish!",
                r.one.name, r.two.name, r.target
            )
        },
    },
    // Exactly one reached the target
    MessageRule {
        applies: |r| (r.one.current >= r.target) != (r.two.current >= r.target),
        render: |r| {
            let (done, chasing) = if r.one.current >= r.target {
                (r.one, r.two)
            } else {
                (r.two, r.one)
            };
            format!(
                "{} has hit the {} target! {} is {} questions behind — keep pushing.",
                done.name,
                r.target,
                chasing.name,
                r.gap()
            )
        },
    },
    // Neither has started
    MessageRule {
        applies: |r| r.one.current == 0 && r.two.current == 0,
        render: |r| {
            format!(
                "Neither of you has started yet. First to log a session takes the lead on {} questions!",
                r.target
            )
        },
    },
    // One has yet to start
    MessageRule {
        applies: |r| (r.one.current == 0) != (r.two.current == 0),
        render: |r| {
            let (runner, idle) = if r.one.current > 0 {
                (r.one, r.two)
            } else {
                (r.two, r.one)
            };
            format!(
                "{} is already {} questions in — {}, the race doesn't start until you do.",
                runner.name, runner.current, idle.name
            )
        },
    },
    // Momentum shift: the lead changed hands since the last snapshot
    MessageRule {
        applies: |r| r.leader_flipped(),
        render: |r| {
            format!(
                "Momentum shift! {} has overtaken {} and leads by {} questions.",
                r.leader().name,
                r.trailer().name,
                r.gap()
            )
        },
    },
    // Exact tie
    MessageRule {
        applies: |r| r.one.current == r.two.current,
        render: |r| {
            format!(
                "Dead heat at {} questions each. The next session breaks the tie.",
                r.one.current
            )
        },
    },
    // Close race: gap under 5% of the target
    MessageRule {
        applies: |r| r.gap_pct() < 5.0,
        render: |r| {
            format!(
                "Only {} questions separate you — {} barely leads {}. Anyone's race.",
                r.gap(),
                r.leader().name,
                r.trailer().name
            )
        },
    },
    // Leader near completion
    MessageRule {
        applies: |r| r.pct(r.leader()) >= 90.0,
        render: |r| {
            let leader = r.leader();
            format!(
                "{} is {:.0}% done with just {} questions to go. {}, it's now or never!",
                leader.name,
                r.pct(leader),
                r.remaining(leader),
                r.trailer().name
            )
        },
    },
    // Leader past three quarters
    MessageRule {
        applies: |r| r.pct(r.leader()) >= 75.0,
        render: |r| {
            let leader = r.leader();
            format!(
                "{} has cleared {:.0}% of the target, leading by {} questions.",
                leader.name,
                r.pct(leader),
                r.gap()
            )
        },
    },
    // Leader past halfway
    MessageRule {
        applies: |r| r.pct(r.leader()) >= 50.0,
        render: |r| {
            let leader = r.leader();
            format!(
                "{} is past halfway at {:.0}%. {} needs {} questions to draw level.",
                leader.name,
                r.pct(leader),
                r.trailer().name,
                r.gap()
            )
        },
    },
    // Big lead: gap at least 30% of the target
    MessageRule {
        applies: |r| r.gap_pct() >= 30.0,
        render: |r| {
            format!(
                "{} has opened up a {}-question lead. {}, time for a comeback.",
                r.leader().name,
                r.gap(),
                r.trailer().name
            )
        },
    },
    // Generic progress fallback
    MessageRule {
        applies: |_| true,
        render: |r| {
            format!(
                "{} leads {} by {} questions. {} questions remain — keep at it!",
                r.leader().name,
                r.trailer().name,
                r.gap(),
                r.remaining(r.leader())
            )
        },
    },
];

/// Pick the banner message for the current race state.
pub fn select_motivational_message(
    one: &ProgressPoint,
    two: &ProgressPoint,
    target: i64,
) -> String {
    let race = Race { one, two, target };
    for rule in RULES {
        if (rule.applies)(&race) {
            return (rule.render)(&race);
        }
    }
    // The fallback rule always applies; this line is unreachable.
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(name: &str, current: i64) -> ProgressPoint {
        ProgressPoint {
            name: name.to_string(),
            current,
            previous: None,
        }
    }

    fn point_with_prev(name: &str, current: i64, previous: i64) -> ProgressPoint {
        ProgressPoint {
            name: name.to_string(),
            current,
            previous: Some(previous),
        }
    }

    #[test]
    fn test_both_reached_target() {
        let msg = select_motivational_message(&point("Asha", 210), &point("Ravi", 200), 200);
        assert!(msg.contains("both"), "{}", msg);
    }

    #[test]
    fn test_one_reached_target_mentions_gap() {
        let msg = select_motivational_message(&point("Asha", 200), &point("Ravi", 50), 200);
        assert!(msg.contains("Asha has hit"), "{}", msg);
        assert!(msg.contains("150"), "{}", msg);
    }

    #[test]
    fn test_neither_started() {
        let msg = select_motivational_message(&point("Asha", 0), &point("Ravi", 0), 200);
        assert!(msg.contains("Neither"), "{}", msg);
    }

    #[test]
    fn test_one_not_started() {
        let msg = select_motivational_message(&point("Asha", 0), &point("Ravi", 40), 200);
        assert!(msg.contains("Ravi is already 40"), "{}", msg);
        assert!(msg.contains("Asha"), "{}", msg);
    }

    #[test]
    fn test_momentum_shift_beats_leader_rules() {
        // Ravi was behind (30 < 90) and is now ahead (180 > 160); the
        // overtake outranks the 90%-done rule even though Ravi is at 90%.
        let msg = select_motivational_message(
            &point_with_prev("Asha", 160, 90),
            &point_with_prev("Ravi", 180, 30),
            200,
        );
        assert!(msg.contains("Momentum shift"), "{}", msg);
        assert!(msg.contains("Ravi"), "{}", msg);
    }

    #[test]
    fn test_exact_tie() {
        let msg = select_motivational_message(&point("Asha", 80), &point("Ravi", 80), 200);
        assert!(msg.contains("Dead heat at 80"), "{}", msg);
    }

    #[test]
    fn test_close_race_under_five_percent() {
        // Gap of 8 on a 200 target is 4%.
        let msg = select_motivational_message(&point("Asha", 60), &point("Ravi", 52), 200);
        assert!(msg.contains("Only 8 questions"), "{}", msg);
    }

    #[test]
    fn test_leader_near_completion() {
        let msg = select_motivational_message(&point("Asha", 190), &point("Ravi", 100), 200);
        assert!(msg.contains("95%"), "{}", msg);
        assert!(msg.contains("10 questions to go"), "{}", msg);
    }

    #[test]
    fn test_leader_tiers() {
        // 75% tier
        let msg = select_motivational_message(&point("Asha", 155), &point("Ravi", 60), 200);
        assert!(msg.contains("cleared"), "{}", msg);

        // 50% tier
        let msg = select_motivational_message(&point("Asha", 110), &point("Ravi", 60), 200);
        assert!(msg.contains("past halfway"), "{}", msg);
    }

    #[test]
    fn test_big_gap() {
        // 35% of target apart but leader below halfway.
        let msg = select_motivational_message(&point("Asha", 90), &point("Ravi", 20), 200);
        assert!(msg.contains("70-question lead"), "{}", msg);
    }

    #[test]
    fn test_generic_fallback() {
        // 10% gap, leader at 20%: none of the special scenarios fire.
        let msg = select_motivational_message(&point("Asha", 40), &point("Ravi", 20), 200);
        assert!(msg.contains("leads"), "{}", msg);
        assert!(msg.contains("160 questions remain"), "{}", msg);
    }
}
