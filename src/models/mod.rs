use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DF")]
    Defender,
    #[serde(rename = "MF")]
    Midfielder,
    #[serde(rename = "FW")]
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DF",
            Position::Midfielder => "MF",
            Position::Forward => "FW",
        }
    }

    /// Positions that take part in the scorer draw.
    pub fn is_attacking(&self) -> bool {
        matches!(self, Position::Midfielder | Position::Forward)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GK" => Ok(Position::Goalkeeper),
            "DF" => Ok(Position::Defender),
            "MF" => Ok(Position::Midfielder),
            "FW" => Ok(Position::Forward),
            other => Err(format!("unknown position '{}', expected GK, DF, MF or FW", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayStyle {
    Offensive,
    Defensive,
    Balanced,
}

impl PlayStyle {
    pub const ALL: [PlayStyle; 3] = [PlayStyle::Offensive, PlayStyle::Defensive, PlayStyle::Balanced];
}

impl fmt::Display for PlayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayStyle::Offensive => "Offensive",
            PlayStyle::Defensive => "Defensive",
            PlayStyle::Balanced => "Balanced",
        };
        f.write_str(label)
    }
}

/// The nine attribute scores every player carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub pace: u8,
    pub shooting: u8,
    pub passing: u8,
    pub technique: u8,
    pub power: u8,
    pub defending: u8,
    pub physical: u8,
    pub mental: u8,
    pub goalkeeping: u8,
}

impl Attributes {
    #[cfg(test)]
    pub fn uniform(value: u8) -> Self {
        Self {
            pace: value,
            shooting: value,
            passing: value,
            technique: value,
            power: value,
            defending: value,
            physical: value,
            mental: value,
            goalkeeping: value,
        }
    }

    /// Position-aware overall rating used for line-up selection and pricing.
    pub fn rating_for(&self, position: Position) -> f64 {
        let weighted: [(u8, f64); 4] = match position {
            Position::Goalkeeper => [
                (self.goalkeeping, 0.6),
                (self.mental, 0.2),
                (self.physical, 0.1),
                (self.passing, 0.1),
            ],
            Position::Defender => [
                (self.defending, 0.45),
                (self.physical, 0.25),
                (self.mental, 0.15),
                (self.pace, 0.15),
            ],
            Position::Midfielder => [
                (self.passing, 0.35),
                (self.technique, 0.3),
                (self.mental, 0.2),
                (self.pace, 0.15),
            ],
            Position::Forward => [
                (self.shooting, 0.4),
                (self.technique, 0.25),
                (self.power, 0.2),
                (self.pace, 0.15),
            ],
        };

        weighted.iter().map(|(value, weight)| *value as f64 * weight).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: Position,
    pub age: u8,
    pub nationality: String,
    pub attributes: Attributes,
    /// None while the player is a scout candidate.
    pub club: Option<String>,
    pub appearances: u32,
    pub goals: u32,
    /// Season total; the resetting accumulation counter lives in the ledger.
    pub yellow_cards: u32,
}

impl Player {
    pub fn rating(&self) -> f64 {
        self.attributes.rating_for(self.position)
    }

    pub fn reset_season_counters(&mut self) {
        self.appearances = 0;
        self.goals = 0;
        self.yellow_cards = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClubKind {
    Human { funds: u64 },
    Ai { style: PlayStyle },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub kind: ClubKind,
    pub players: Vec<Player>,
}

impl Team {
    pub fn is_human(&self) -> bool {
        matches!(self.kind, ClubKind::Human { .. })
    }

    /// The human club plays without a fixed style, which is the neutral one.
    pub fn play_style(&self) -> PlayStyle {
        match self.kind {
            ClubKind::Ai { style } => style,
            ClubKind::Human { .. } => PlayStyle::Balanced,
        }
    }

    pub fn funds(&self) -> Option<u64> {
        match self.kind {
            ClubKind::Human { funds } => Some(funds),
            ClubKind::Ai { .. } => None,
        }
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
}

impl TableRow {
    pub fn new(team: &str) -> Self {
        Self {
            team: team.to_string(),
            ..Default::default()
        }
    }

    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }

    /// Apply one finished match from this team's point of view.
    pub fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.wins += 1;
                self.points += 3;
            }
            std::cmp::Ordering::Equal => {
                self.draws += 1;
                self.points += 1;
            }
            std::cmp::Ordering::Less => self.losses += 1,
        }
    }
}

/// A ranked, display-ready table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow {
    pub position: usize,
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
    pub form: String, // Last 5 results, most recent last: "WDLWW"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub round: u32,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalEvent {
    pub team: String,
    /// None when the side had nobody eligible to credit.
    pub scorer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEvent {
    pub team: String,
    pub player: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryEvent {
    pub team: String,
    pub player: String,
    pub recovery_rounds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    HomeWin,
    Draw,
    AwayWin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub round: u32,
    pub home: String,
    pub away: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub home_xg: f64,
    pub away_xg: f64,
    pub goals: Vec<GoalEvent>,
    pub cards: Vec<CardEvent>,
    pub injuries: Vec<InjuryEvent>,
    pub home_lineup: Vec<String>,
    pub away_lineup: Vec<String>,
}

impl MatchResult {
    pub fn outcome(&self) -> MatchOutcome {
        match self.home_goals.cmp(&self.away_goals) {
            std::cmp::Ordering::Greater => MatchOutcome::HomeWin,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
            std::cmp::Ordering::Less => MatchOutcome::AwayWin,
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }

    /// 'W', 'D' or 'L' from the given team's point of view.
    pub fn result_char_for(&self, team: &str) -> Option<char> {
        if !self.involves(team) {
            return None;
        }

        let at_home = self.home == team;
        Some(match self.outcome() {
            MatchOutcome::Draw => 'D',
            MatchOutcome::HomeWin if at_home => 'W',
            MatchOutcome::AwayWin if !at_home => 'W',
            _ => 'L',
        })
    }
}

/// Immutable record of one completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonHistoryEntry {
    pub round: u32,
    pub results: Vec<MatchResult>,
    pub byes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    pub results: Vec<MatchResult>,
    pub standings: Vec<StandingRow>,
    pub season_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SeasonPhase {
    NotStarted,
    InProgress { next_round: u32 },
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Available,
    Signed,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutCandidate {
    pub id: Uuid,
    pub player: Player,
    pub asking_price: u64,
    pub status: CandidateStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub candidate_id: Uuid,
    pub player: String,
    pub asking_price: u64,
    pub status: CandidateStatus,
    /// Round pointer at the time the candidate was resolved.
    pub round: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlayerStatus {
    Available,
    Injured { until_round: u32 },
    Suspended { round: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub player: String,
    pub club: String,
    pub season_yellows: u32,
    pub accumulated_yellows: u32,
    pub status: PlayerStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopScorer {
    pub player: String,
    pub club: String,
    pub goals: u32,
    pub appearances: u32,
}

/// Everything the presentation layer may read, in one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SeasonPhase,
    pub funds: u64,
    pub table: Vec<StandingRow>,
    pub history: Vec<SeasonHistoryEntry>,
    pub teams: Vec<Team>,
    pub candidates: Vec<ScoutCandidate>,
    pub ledger: Vec<LedgerEntry>,
    pub transfers: Vec<TransferRecord>,
}

// API Response types
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
