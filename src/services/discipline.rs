//! Yellow-card accumulation, suspensions and the injury list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Player, PlayerStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOutcome {
    Warning { accumulated: u32 },
    Suspended { round: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineLedger {
    threshold: u32,
    accumulated: BTreeMap<String, u32>,
    // player -> the single round they sit out
    suspensions: BTreeMap<String, u32>,
    // player -> first round they are fit again
    injuries: BTreeMap<String, u32>,
}

impl DisciplineLedger {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            accumulated: BTreeMap::new(),
            suspensions: BTreeMap::new(),
            injuries: BTreeMap::new(),
        }
    }

    /// Book a yellow card. Reaching the threshold suspends the player for
    /// `next_match_round`, the club's next fixture, and clears the counter.
    pub fn record_yellow(&mut self, player: &str, next_match_round: u32) -> CardOutcome {
        let count = {
            let entry = self.accumulated.entry(player.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        if count < self.threshold {
            return CardOutcome::Warning { accumulated: count };
        }

        self.accumulated.remove(player);
        // One suspension per crossing; a pending one is not extended.
        let suspended_round = *self
            .suspensions
            .entry(player.to_string())
            .or_insert(next_match_round);

        tracing::debug!("{} reached {} yellow cards", player, self.threshold);
        CardOutcome::Suspended { round: suspended_round }
    }

    /// Injure a player in `round` for `recovery_rounds` rounds.
    pub fn record_injury(&mut self, player: &str, round: u32, recovery_rounds: u32) -> u32 {
        let until_round = round + recovery_rounds.max(1) + 1;
        let entry = self.injuries.entry(player.to_string()).or_insert(until_round);
        *entry = (*entry).max(until_round);
        *entry
    }

    pub fn accumulated(&self, player: &str) -> u32 {
        self.accumulated.get(player).copied().unwrap_or(0)
    }

    pub fn is_suspended(&self, player: &str, round: u32) -> bool {
        self.suspensions.get(player) == Some(&round)
    }

    pub fn is_injured(&self, player: &str, round: u32) -> bool {
        self.injuries.get(player).is_some_and(|until| round < *until)
    }

    pub fn is_available(&self, player: &Player, round: u32) -> bool {
        !self.is_injured(&player.name, round) && !self.is_suspended(&player.name, round)
    }

    pub fn status(&self, player: &str, round: u32) -> PlayerStatus {
        if let Some(until_round) = self.injuries.get(player).filter(|until| round < **until) {
            PlayerStatus::Injured { until_round: *until_round }
        } else if let Some(suspended) = self.suspensions.get(player).filter(|r| **r >= round) {
            PlayerStatus::Suspended { round: *suspended }
        } else {
            PlayerStatus::Available
        }
    }

    /// Move the ledger to a new round pointer: served suspensions and healed
    /// injuries drop off.
    pub fn advance_to(&mut self, round: u32) {
        self.suspensions.retain(|_, suspended| *suspended >= round);
        self.injuries.retain(|player, until| {
            let still_out = round < *until;
            if !still_out {
                tracing::debug!("{} returns from injury for round {}", player, round);
            }
            still_out
        });
    }

    pub fn reset(&mut self) {
        self.accumulated.clear();
        self.suspensions.clear();
        self.injuries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(ledger: &DisciplineLedger) -> Vec<&str> {
        let mut names: Vec<&str> = ledger
            .accumulated
            .keys()
            .chain(ledger.suspensions.keys())
            .chain(ledger.injuries.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    #[test]
    fn test_threshold_suspends_next_round_only() {
        let mut ledger = DisciplineLedger::new(3);
        assert_eq!(ledger.record_yellow("Nico", 2), CardOutcome::Warning { accumulated: 1 });
        assert_eq!(ledger.record_yellow("Nico", 3), CardOutcome::Warning { accumulated: 2 });
        assert_eq!(ledger.record_yellow("Nico", 4), CardOutcome::Suspended { round: 4 });

        // Counter cleared at the crossing
        assert_eq!(ledger.accumulated("Nico"), 0);
        assert!(!ledger.is_suspended("Nico", 3));
        assert!(ledger.is_suspended("Nico", 4));
        assert!(!ledger.is_suspended("Nico", 5));
        assert_eq!(ledger.status("Nico", 4), PlayerStatus::Suspended { round: 4 });

        ledger.advance_to(5);
        assert_eq!(ledger.status("Nico", 5), PlayerStatus::Available);
        assert!(tracked(&ledger).is_empty());
    }

    #[test]
    fn test_suspension_can_skip_a_bye() {
        let mut ledger = DisciplineLedger::new(1);
        // Carded in round 1, club idle in round 2
        assert_eq!(ledger.record_yellow("Wim", 3), CardOutcome::Suspended { round: 3 });
        assert!(!ledger.is_suspended("Wim", 2));
        ledger.advance_to(2);
        assert!(ledger.is_suspended("Wim", 3));
        assert_eq!(ledger.status("Wim", 2), PlayerStatus::Suspended { round: 3 });
    }

    #[test]
    fn test_suspension_does_not_stack() {
        let mut ledger = DisciplineLedger::new(1);
        assert_eq!(ledger.record_yellow("Oscar", 3), CardOutcome::Suspended { round: 3 });
        ledger.record_yellow("Oscar", 3);
        assert!(ledger.is_suspended("Oscar", 3));
        assert!(!ledger.is_suspended("Oscar", 4));
    }

    #[test]
    fn test_injury_lockout_and_recovery() {
        let mut ledger = DisciplineLedger::new(3);
        let until = ledger.record_injury("Hugo", 2, 2);
        assert_eq!(until, 5);
        assert!(ledger.is_injured("Hugo", 3));
        assert!(ledger.is_injured("Hugo", 4));
        assert!(!ledger.is_injured("Hugo", 5));
        assert_eq!(ledger.status("Hugo", 3), PlayerStatus::Injured { until_round: 5 });

        ledger.advance_to(4);
        assert_eq!(tracked(&ledger), vec!["Hugo"]);
        ledger.advance_to(5);
        assert!(tracked(&ledger).is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut ledger = DisciplineLedger::new(2);
        ledger.record_yellow("A", 1);
        ledger.record_yellow("B", 1);
        ledger.record_yellow("B", 2);
        ledger.record_injury("C", 1, 3);
        ledger.reset();
        assert!(tracked(&ledger).is_empty());
        assert_eq!(ledger.threshold, 2);
    }
}
