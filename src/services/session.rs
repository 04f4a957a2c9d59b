use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{
    ClubKind, Fixture, LedgerEntry, Player, PlayerStatus, ScoutCandidate, SeasonHistoryEntry, SeasonPhase,
    SessionSnapshot, StandingRow, Team, TopScorer, TransferRecord,
};
use crate::roster::{generate_ai_clubs, load_roster, NameRegistry};
use crate::services::{DisciplineLedger, LeagueState, MatchEngine, ScoutBoard};

/// One running game: the human club, the AI clubs, the league, the ledger
/// and the scout list, plus the seeded random stream every draw comes from.
/// The human club is always the first team.
pub struct Session {
    pub(crate) config: EngineConfig,
    pub(crate) rng: StdRng,
    pub(crate) engine: MatchEngine,
    pub(crate) teams: Vec<Team>,
    pub(crate) player_names: NameRegistry,
    pub(crate) league: LeagueState,
    pub(crate) ledger: DisciplineLedger,
    pub(crate) scout: ScoutBoard,
}

impl Session {
    pub fn new(config: EngineConfig, human_players: Vec<Player>) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut player_names = NameRegistry::new();
        let mut club_names = NameRegistry::new();

        let club_name = club_names.claim(&config.club_name);
        let players: Vec<Player> = human_players
            .into_iter()
            .map(|mut player| {
                let name = player_names.claim(&player.name);
                if name != player.name {
                    tracing::warn!("Duplicate roster name '{}' renamed to '{}'", player.name, name);
                    player.name = name;
                }
                player.club = Some(club_name.clone());
                player
            })
            .collect();

        let human = Team {
            name: club_name,
            kind: ClubKind::Human {
                funds: config.starting_funds,
            },
            players,
        };

        let ai_clubs = generate_ai_clubs(
            &mut rng,
            &mut player_names,
            &mut club_names,
            config.ai_clubs,
            config.squad_size,
        );

        let mut teams = Vec::with_capacity(ai_clubs.len() + 1);
        teams.push(human);
        teams.extend(ai_clubs);

        let names: Vec<String> = teams.iter().map(|t| t.name.clone()).collect();
        let league = LeagueState::new(&names);

        tracing::info!(
            "Session ready: {} clubs, {} rounds, seed {}",
            teams.len(),
            league.total_rounds(),
            config.seed
        );

        Self {
            engine: MatchEngine::new(config.tuning.clone()),
            ledger: DisciplineLedger::new(config.yellow_card_threshold),
            scout: ScoutBoard::default(),
            config,
            rng,
            teams,
            player_names,
            league,
        }
    }

    pub fn from_roster_file(config: EngineConfig) -> Result<Self, EngineError> {
        let players = load_roster(&config.roster_path)?;
        Ok(Self::new(config, players))
    }

    pub fn current_round(&self) -> u32 {
        self.league.current_round
    }

    pub fn total_rounds(&self) -> u32 {
        self.league.total_rounds()
    }

    pub fn phase(&self) -> SeasonPhase {
        self.league.phase()
    }

    pub fn human(&self) -> &Team {
        &self.teams[0]
    }

    pub(crate) fn human_mut(&mut self) -> &mut Team {
        &mut self.teams[0]
    }

    pub fn funds(&self) -> u64 {
        self.human().funds().unwrap_or(0)
    }

    pub fn table(&self) -> Vec<StandingRow> {
        self.league.standings()
    }

    pub fn history(&self) -> &[SeasonHistoryEntry] {
        self.league.history()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    pub(crate) fn team_index(&self, name: &str) -> Option<usize> {
        self.teams.iter().position(|t| t.name == name)
    }

    pub(crate) fn player_mut(&mut self, team: &str, player: &str) -> Option<&mut Player> {
        self.teams
            .iter_mut()
            .find(|t| t.name == team)
            .and_then(|t| t.player_mut(player))
    }

    pub fn fixtures_for(&self, team: &str) -> Vec<&Fixture> {
        self.league.schedule.fixtures_for(team)
    }

    pub fn candidates(&self) -> &[ScoutCandidate] {
        self.scout.candidates()
    }

    pub fn transfers(&self) -> &[TransferRecord] {
        self.scout.log()
    }

    /// Availability for the next round to be played.
    pub fn player_status(&self, player: &str) -> PlayerStatus {
        self.ledger.status(player, self.league.current_round)
    }

    /// Every rostered player with a card, a suspension or an injury.
    pub fn ledger_entries(&self) -> Vec<LedgerEntry> {
        let round = self.league.current_round;
        self.teams
            .iter()
            .flat_map(|team| team.players.iter().map(move |p| (team, p)))
            .filter_map(|(team, player)| {
                let accumulated = self.ledger.accumulated(&player.name);
                let status = self.ledger.status(&player.name, round);
                let tracked = player.yellow_cards > 0 || accumulated > 0 || status != PlayerStatus::Available;
                tracked.then(|| LedgerEntry {
                    player: player.name.clone(),
                    club: team.name.clone(),
                    season_yellows: player.yellow_cards,
                    accumulated_yellows: accumulated,
                    status,
                })
            })
            .collect()
    }

    /// Goals desc, then fewer appearances, then name.
    pub fn top_scorers(&self, limit: usize) -> Vec<TopScorer> {
        let mut scorers: Vec<TopScorer> = self
            .teams
            .iter()
            .flat_map(|team| {
                team.players.iter().filter(|p| p.goals > 0).map(move |p| TopScorer {
                    player: p.name.clone(),
                    club: team.name.clone(),
                    goals: p.goals,
                    appearances: p.appearances,
                })
            })
            .collect();

        scorers.sort_by(|a, b| {
            b.goals
                .cmp(&a.goals)
                .then(a.appearances.cmp(&b.appearances))
                .then_with(|| a.player.cmp(&b.player))
        });
        scorers.truncate(limit);
        scorers
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            funds: self.funds(),
            table: self.table(),
            history: self.history().to_vec(),
            teams: self.teams.clone(),
            candidates: self.candidates().to_vec(),
            ledger: self.ledger_entries(),
            transfers: self.transfers().to_vec(),
        }
    }
}
