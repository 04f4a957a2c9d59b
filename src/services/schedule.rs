use serde::{Deserialize, Serialize};

use crate::models::Fixture;

/// One round of index pairings: (home, away).
pub type Pairings = Vec<(usize, usize)>;

/// Single round-robin by the circle method: team 0 stays fixed while the
/// others rotate. An odd team count gets a phantom slot, and whoever meets
/// it sits the round out.
pub fn round_robin(team_count: usize) -> Vec<Pairings> {
    if team_count < 2 {
        return Vec::new();
    }

    let slots = if team_count % 2 == 0 { team_count } else { team_count + 1 };
    let bye = team_count; // only reachable when team_count is odd
    let mut ring: Vec<usize> = (0..slots).collect();
    let mut rounds = Vec::with_capacity(slots - 1);

    for round in 0..slots - 1 {
        let mut pairings = Vec::with_capacity(slots / 2);
        for i in 0..slots / 2 {
            let a = ring[i];
            let b = ring[slots - 1 - i];
            if a == bye || b == bye {
                continue;
            }

            // Alternate venues so no side is stuck at home all leg long
            let swap = if i == 0 { round % 2 == 1 } else { i % 2 == 1 };
            pairings.push(if swap { (b, a) } else { (a, b) });
        }
        rounds.push(pairings);
        ring[1..].rotate_right(1);
    }

    rounds
}

/// Home-and-away season: the first leg, then the same rounds mirrored.
pub fn double_round_robin(team_count: usize) -> Vec<Pairings> {
    let first_leg = round_robin(team_count);
    let second_leg: Vec<Pairings> = first_leg
        .iter()
        .map(|round| round.iter().map(|&(home, away)| (away, home)).collect())
        .collect();

    first_leg.into_iter().chain(second_leg).collect()
}

/// The season's fixture list, generated once from the team order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    teams: Vec<String>,
    rounds: Vec<Vec<Fixture>>,
}

impl Schedule {
    pub fn new(teams: &[String]) -> Self {
        let rounds = double_round_robin(teams.len())
            .into_iter()
            .enumerate()
            .map(|(i, pairings)| {
                let round = i as u32 + 1;
                pairings
                    .into_iter()
                    .map(|(home, away)| Fixture {
                        round,
                        home: teams[home].clone(),
                        away: teams[away].clone(),
                    })
                    .collect()
            })
            .collect();

        Self {
            teams: teams.to_vec(),
            rounds,
        }
    }

    pub fn total_rounds(&self) -> u32 {
        self.rounds.len() as u32
    }

    /// Fixtures of a 1-based round; empty outside the season.
    pub fn round(&self, round: u32) -> &[Fixture] {
        round
            .checked_sub(1)
            .and_then(|i| self.rounds.get(i as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Teams without a fixture in the given round.
    pub fn byes(&self, round: u32) -> Vec<String> {
        let fixtures = self.round(round);
        self.teams
            .iter()
            .filter(|team| !fixtures.iter().any(|f| &f.home == *team || &f.away == *team))
            .cloned()
            .collect()
    }

    pub fn fixtures_for(&self, team: &str) -> Vec<&Fixture> {
        self.rounds
            .iter()
            .flatten()
            .filter(|f| f.home == team || f.away == team)
            .collect()
    }

    /// First round after `after` in which `team` has a fixture.
    pub fn next_fixture_round(&self, team: &str, after: u32) -> Option<u32> {
        self.fixtures_for(team)
            .into_iter()
            .map(|f| f.round)
            .find(|&round| round > after)
    }
}
