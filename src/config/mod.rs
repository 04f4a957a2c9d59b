use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::validate_team_name;

/// Weighting constants of the match engine. None of these are contract;
/// the engine only guarantees the shape (monotonic in attribute strength,
/// play style shifts the attack/defence balance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTuning {
    pub attack_shooting: f64,
    pub attack_technique: f64,
    pub attack_power: f64,
    pub attack_passing: f64,
    pub attack_pace: f64,
    pub defence_defending: f64,
    pub defence_physical: f64,
    pub defence_mental: f64,
    pub keeper_weight: f64,

    // How much each position contributes to the team's attack / defence.
    pub attack_forward: f64,
    pub attack_midfielder: f64,
    pub attack_defender: f64,
    pub defence_defender: f64,
    pub defence_midfielder: f64,
    pub defence_forward: f64,

    pub offensive_attack: f64,
    pub offensive_defence: f64,
    pub defensive_attack: f64,
    pub defensive_defence: f64,

    pub home_advantage: f64,
    pub base_goals: f64,
    pub strength_exponent: f64,
    pub min_xg: f64,
    pub max_xg: f64,
    pub max_goals: u32,
    pub baseline_strength: f64,
    pub lineup_size: usize,

    pub card_rate: f64,
    pub injury_rate: f64,
    pub max_recovery_rounds: u32,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            attack_shooting: 0.35,
            attack_technique: 0.25,
            attack_power: 0.15,
            attack_passing: 0.15,
            attack_pace: 0.10,
            defence_defending: 0.5,
            defence_physical: 0.3,
            defence_mental: 0.2,
            keeper_weight: 1.5,

            attack_forward: 1.0,
            attack_midfielder: 0.7,
            attack_defender: 0.3,
            defence_defender: 1.0,
            defence_midfielder: 0.6,
            defence_forward: 0.2,

            offensive_attack: 1.15,
            offensive_defence: 0.9,
            defensive_attack: 0.9,
            defensive_defence: 1.15,

            home_advantage: 1.05,
            base_goals: 1.35,
            strength_exponent: 1.5,
            min_xg: 0.1,
            max_xg: 6.0,
            max_goals: 10,
            baseline_strength: 20.0,
            lineup_size: 11,

            card_rate: 2.0,
            injury_rate: 0.15,
            max_recovery_rounds: 4,
        }
    }
}

impl MatchTuning {
    /// Reject tunings the engine cannot play a season with.
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("home_advantage", self.home_advantage),
            ("base_goals", self.base_goals),
            ("strength_exponent", self.strength_exponent),
            ("min_xg", self.min_xg),
            ("max_xg", self.max_xg),
            ("baseline_strength", self.baseline_strength),
            ("card_rate", self.card_rate),
            ("injury_rate", self.injury_rate),
        ];
        for (name, value) in rates {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{} must be a finite, non-negative number (got {})",
                name,
                value
            );
        }
        ensure!(
            self.min_xg <= self.max_xg,
            "min_xg ({}) is above max_xg ({})",
            self.min_xg,
            self.max_xg
        );
        ensure!(self.lineup_size > 0, "lineup_size must be at least 1");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub roster_path: PathBuf,
    pub seed: u64,
    pub club_name: String,
    pub starting_funds: u64,
    pub yellow_card_threshold: u32,
    pub scout_list_size: usize,
    pub ai_clubs: usize,
    pub squad_size: usize,
    pub tuning: MatchTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("data/roster.csv"),
            seed: 42,
            club_name: "Rustport Athletic".to_string(),
            starting_funds: 30_000,
            yellow_card_threshold: 3,
            scout_list_size: 5,
            ai_clubs: 7,
            squad_size: 16,
            tuning: MatchTuning::default(),
        }
    }
}

impl EngineConfig {
    /// Build the configuration from the environment (after `dotenv`), falling
    /// back to defaults for anything absent or malformed.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let club_name = env::var("CLUB_NAME").unwrap_or_else(|_| defaults.club_name.clone());
        let club_name = if validate_team_name(&club_name) {
            club_name.trim().to_string()
        } else {
            tracing::warn!("CLUB_NAME '{}' is not a valid team name, using '{}'", club_name, defaults.club_name);
            defaults.club_name.clone()
        };

        let tuning = match env::var("MATCH_TUNING_PATH") {
            Ok(path) => load_tuning(&path)?,
            Err(_) => defaults.tuning.clone(),
        };

        Ok(Self {
            roster_path: env::var("ROSTER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.roster_path),
            seed: env_or("SEASON_SEED", defaults.seed),
            club_name,
            starting_funds: env_or("STARTING_FUNDS", defaults.starting_funds),
            yellow_card_threshold: env_or("YELLOW_CARD_THRESHOLD", defaults.yellow_card_threshold).max(1),
            scout_list_size: env_or("SCOUT_LIST_SIZE", defaults.scout_list_size),
            ai_clubs: env_or("AI_CLUBS", defaults.ai_clubs),
            squad_size: env_or("SQUAD_SIZE", defaults.squad_size),
            tuning,
        })
    }
}

fn env_or<T: FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{}='{}' could not be parsed, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn load_tuning(path: &str) -> Result<MatchTuning> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading match tuning from {}", path))?;
    let tuning: MatchTuning = serde_json::from_str(&raw)
        .with_context(|| format!("parsing match tuning in {}", path))?;
    tuning
        .validate()
        .with_context(|| format!("invalid match tuning in {}", path))?;
    tracing::info!("Loaded match tuning overrides from {}", path);
    Ok(tuning)
}
