use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{MatchResult, SeasonHistoryEntry, SeasonPhase, StandingRow, TableRow};
use crate::services::Schedule;
use crate::utils::results_to_form;

// What the standings are sorted by, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankCriteria {
    Points,
    GoalDifference,
    GoalsScored,
    // Deterministic last resort so the order is total.
    Name,
}

pub const STANDARD_CRITERIA: [RankCriteria; 4] = [
    RankCriteria::Points,
    RankCriteria::GoalDifference,
    RankCriteria::GoalsScored,
    RankCriteria::Name,
];

impl RankCriteria {
    pub fn compare(&self, a: &TableRow, b: &TableRow) -> Ordering {
        match self {
            RankCriteria::Points => b.points.cmp(&a.points),
            RankCriteria::GoalDifference => b.goal_difference().cmp(&a.goal_difference()),
            RankCriteria::GoalsScored => b.goals_for.cmp(&a.goals_for),
            RankCriteria::Name => a.team.cmp(&b.team),
        }
    }
}

pub fn compare_rows(a: &TableRow, b: &TableRow) -> Ordering {
    STANDARD_CRITERIA
        .iter()
        .fold(Ordering::Equal, |order, criteria| order.then_with(|| criteria.compare(a, b)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueTable {
    rows: Vec<TableRow>,
}

impl LeagueTable {
    pub fn new(teams: &[String]) -> Self {
        Self {
            rows: teams.iter().map(|t| TableRow::new(t)).collect(),
        }
    }

    /// Credit both sides of a finished match.
    pub fn apply(&mut self, result: &MatchResult) {
        if let Some(home) = self.rows.iter_mut().find(|r| r.team == result.home) {
            home.record(result.home_goals, result.away_goals);
        }
        if let Some(away) = self.rows.iter_mut().find(|r| r.team == result.away) {
            away.record(result.away_goals, result.home_goals);
        }
    }

    pub fn ranked(&self) -> Vec<TableRow> {
        let mut rows = self.rows.clone();
        rows.sort_by(compare_rows);
        rows
    }

    pub fn total_goals_for(&self) -> u32 {
        self.rows.iter().map(|r| r.goals_for).sum()
    }

    pub fn total_goals_against(&self) -> u32 {
        self.rows.iter().map(|r| r.goals_against).sum()
    }
}

/// Standings, schedule, round pointer and the append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueState {
    pub table: LeagueTable,
    pub schedule: Schedule,
    /// Next round to be played, 1-based.
    pub current_round: u32,
    history: Vec<SeasonHistoryEntry>,
}

impl LeagueState {
    pub fn new(teams: &[String]) -> Self {
        Self {
            table: LeagueTable::new(teams),
            schedule: Schedule::new(teams),
            current_round: 1,
            history: Vec::new(),
        }
    }

    pub fn total_rounds(&self) -> u32 {
        self.schedule.total_rounds()
    }

    pub fn is_complete(&self) -> bool {
        self.current_round > self.total_rounds()
    }

    pub fn phase(&self) -> SeasonPhase {
        if self.is_complete() {
            SeasonPhase::Complete
        } else if self.history.is_empty() {
            SeasonPhase::NotStarted
        } else {
            SeasonPhase::InProgress {
                next_round: self.current_round,
            }
        }
    }

    pub fn history(&self) -> &[SeasonHistoryEntry] {
        &self.history
    }

    pub fn record_round(&mut self, entry: SeasonHistoryEntry) {
        self.history.push(entry);
        self.current_round += 1;
    }

    /// Ranked standings with each team's recent form.
    pub fn standings(&self) -> Vec<StandingRow> {
        self.table
            .ranked()
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let results: Vec<(char, u32)> = self
                    .history
                    .iter()
                    .flat_map(|entry| entry.results.iter())
                    .filter_map(|m| m.result_char_for(&row.team).map(|c| (c, m.round)))
                    .collect();

                StandingRow {
                    position: i + 1,
                    goal_difference: row.goal_difference(),
                    form: results_to_form(&results),
                    team: row.team,
                    played: row.played,
                    wins: row.wins,
                    draws: row.draws,
                    losses: row.losses,
                    goals_for: row.goals_for,
                    goals_against: row.goals_against,
                    points: row.points,
                }
            })
            .collect()
    }
}
