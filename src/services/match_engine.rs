use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::RngExt;
use statrs::distribution::{DiscreteCDF, Poisson};

use crate::config::MatchTuning;
use crate::models::{
    CardEvent, GoalEvent, InjuryEvent, MatchResult, PlayStyle, Player, Position, Team,
};
use crate::services::DisciplineLedger;

/// Aggregate attacking and defensive strength of a fielded side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamStrength {
    pub attack: f64,
    pub defence: f64,
}

/// Statistical match engine: aggregate strengths, expected goals, Poisson
/// draws. It never mutates the teams; the only state it touches is the
/// random source passed in.
pub struct MatchEngine {
    tuning: MatchTuning,
}

impl MatchEngine {
    pub fn new(tuning: MatchTuning) -> Self {
        Self { tuning }
    }

    pub fn simulate(
        &self,
        home: &Team,
        away: &Team,
        round: u32,
        ledger: &DisciplineLedger,
        rng: &mut StdRng,
    ) -> MatchResult {
        let home_lineup = self.select_lineup(home, round, ledger);
        let away_lineup = self.select_lineup(away, round, ledger);

        let mut home_strength = self.team_strength(&home_lineup, home.play_style());
        let away_strength = self.team_strength(&away_lineup, away.play_style());
        home_strength.attack *= self.tuning.home_advantage;

        let home_xg = self.expected_goals(home_strength.attack, away_strength.defence);
        let away_xg = self.expected_goals(away_strength.attack, home_strength.defence);

        let home_goals = sample_poisson(rng, home_xg, self.tuning.max_goals);
        let away_goals = sample_poisson(rng, away_xg, self.tuning.max_goals);

        let mut goals = Vec::with_capacity((home_goals + away_goals) as usize);
        for _ in 0..home_goals {
            goals.push(GoalEvent {
                team: home.name.clone(),
                scorer: pick_scorer(rng, &home_lineup),
            });
        }
        for _ in 0..away_goals {
            goals.push(GoalEvent {
                team: away.name.clone(),
                scorer: pick_scorer(rng, &away_lineup),
            });
        }

        // Physical contests produce more cards and knocks
        let intensity = match_intensity(&home_lineup, &away_lineup);

        let mut cards = self.draw_cards(rng, &home.name, &home_lineup, intensity);
        cards.extend(self.draw_cards(rng, &away.name, &away_lineup, intensity));

        let mut injuries = self.draw_injuries(rng, &home.name, &home_lineup, intensity);
        injuries.extend(self.draw_injuries(rng, &away.name, &away_lineup, intensity));

        tracing::debug!(
            "Round {}: {} {}-{} {} (xG {:.2}-{:.2})",
            round,
            home.name,
            home_goals,
            away_goals,
            away.name,
            home_xg,
            away_xg
        );

        MatchResult {
            round,
            home: home.name.clone(),
            away: away.name.clone(),
            home_goals,
            away_goals,
            home_xg,
            away_xg,
            goals,
            cards,
            injuries,
            home_lineup: home_lineup.iter().map(|p| p.name.clone()).collect(),
            away_lineup: away_lineup.iter().map(|p| p.name.clone()).collect(),
        }
    }

    /// Pick at most `lineup_size` eligible players: the best goalkeeper, a
    /// 4-4-2 outfield by positional rating, then the best of whoever is left.
    pub fn select_lineup<'a>(&self, team: &'a Team, round: u32, ledger: &DisciplineLedger) -> Vec<&'a Player> {
        let mut pool: Vec<&Player> = team
            .players
            .iter()
            .filter(|p| ledger.is_available(p, round))
            .collect();
        // Best first; name keeps equal ratings in a stable order
        pool.sort_by(|a, b| b.rating().total_cmp(&a.rating()).then_with(|| a.name.cmp(&b.name)));

        let size = self.tuning.lineup_size;
        let shape = [
            (Position::Goalkeeper, 1),
            (Position::Defender, 4),
            (Position::Midfielder, 4),
            (Position::Forward, 2),
        ];

        let mut lineup: Vec<&Player> = Vec::with_capacity(size);
        for (position, wanted) in shape {
            let picks: Vec<&Player> = pool
                .iter()
                .filter(|p| p.position == position)
                .take(wanted)
                .copied()
                .collect();
            lineup.extend(picks);
        }
        lineup.truncate(size);

        // Fill the gaps with the best remaining outfielders, keepers last
        let mut rest: Vec<&Player> = pool
            .iter()
            .filter(|p| !lineup.iter().any(|l| l.name == p.name))
            .copied()
            .collect();
        rest.sort_by_key(|p| p.position == Position::Goalkeeper);
        let missing = size.saturating_sub(lineup.len());
        lineup.extend(rest.into_iter().take(missing));

        lineup
    }

    fn attack_score(&self, player: &Player) -> f64 {
        let t = &self.tuning;
        let a = &player.attributes;
        let weights = t.attack_shooting + t.attack_technique + t.attack_power + t.attack_passing + t.attack_pace;
        if weights <= 0.0 {
            return 0.0;
        }
        (a.shooting as f64 * t.attack_shooting
            + a.technique as f64 * t.attack_technique
            + a.power as f64 * t.attack_power
            + a.passing as f64 * t.attack_passing
            + a.pace as f64 * t.attack_pace)
            / weights
    }

    fn defence_score(&self, player: &Player) -> f64 {
        let t = &self.tuning;
        let a = &player.attributes;
        if player.position == Position::Goalkeeper {
            return a.goalkeeping as f64;
        }
        let weights = t.defence_defending + t.defence_physical + t.defence_mental;
        if weights <= 0.0 {
            return 0.0;
        }
        (a.defending as f64 * t.defence_defending
            + a.physical as f64 * t.defence_physical
            + a.mental as f64 * t.defence_mental)
            / weights
    }

    fn attack_weight(&self, position: Position) -> f64 {
        match position {
            Position::Forward => self.tuning.attack_forward,
            Position::Midfielder => self.tuning.attack_midfielder,
            Position::Defender => self.tuning.attack_defender,
            Position::Goalkeeper => 0.0,
        }
    }

    fn defence_weight(&self, position: Position) -> f64 {
        match position {
            Position::Defender => self.tuning.defence_defender,
            Position::Midfielder => self.tuning.defence_midfielder,
            Position::Forward => self.tuning.defence_forward,
            Position::Goalkeeper => self.tuning.keeper_weight,
        }
    }

    /// Weighted aggregate of the fielded players, scaled down for short
    /// line-ups and shifted by the club's play style. An empty line-up gets
    /// the baseline strength.
    pub fn team_strength(&self, lineup: &[&Player], style: PlayStyle) -> TeamStrength {
        let baseline = self.tuning.baseline_strength;
        if lineup.is_empty() {
            return TeamStrength {
                attack: baseline,
                defence: baseline,
            };
        }

        let weighted_mean = |weight: &dyn Fn(Position) -> f64, score: &dyn Fn(&Player) -> f64| {
            let (sum, total) = lineup.iter().fold((0.0, 0.0), |(sum, total), p| {
                let w = weight(p.position);
                (sum + w * score(*p), total + w)
            });
            if total > 0.0 && sum > 0.0 { sum / total } else { baseline }
        };

        let attack = weighted_mean(&|pos: Position| self.attack_weight(pos), &|p: &Player| self.attack_score(p));
        let defence = weighted_mean(&|pos: Position| self.defence_weight(pos), &|p: &Player| self.defence_score(p));

        let fielded = (lineup.len() as f64 / self.tuning.lineup_size.max(1) as f64).min(1.0);
        let (attack_mult, defence_mult) = match style {
            PlayStyle::Offensive => (self.tuning.offensive_attack, self.tuning.offensive_defence),
            PlayStyle::Defensive => (self.tuning.defensive_attack, self.tuning.defensive_defence),
            PlayStyle::Balanced => (1.0, 1.0),
        };

        TeamStrength {
            attack: attack * fielded * attack_mult,
            defence: defence * fielded * defence_mult,
        }
    }

    /// Expected goals from attack relative to the opponent's defence.
    pub fn expected_goals(&self, attack: f64, opponent_defence: f64) -> f64 {
        let t = &self.tuning;
        let defence = if opponent_defence > 0.0 { opponent_defence } else { t.baseline_strength.max(1.0) };
        let ratio = attack.max(0.0) / defence;
        // Unlike clamp, safe on an inverted range
        (t.base_goals * ratio.powf(t.strength_exponent)).max(t.min_xg).min(t.max_xg)
    }

    fn draw_cards(&self, rng: &mut StdRng, team: &str, lineup: &[&Player], intensity: f64) -> Vec<CardEvent> {
        let count = sample_poisson(rng, self.tuning.card_rate * intensity, lineup.len() as u32);
        let mut candidates: Vec<&Player> = lineup.to_vec();
        let mut cards = Vec::new();

        // Low mental, high physical players see more cards; one per player
        for _ in 0..count {
            let weights: Vec<f64> = candidates
                .iter()
                .map(|p| (p.attributes.physical as f64 + (100.0 - p.attributes.mental as f64)).max(1.0))
                .collect();
            let Some(index) = weighted_pick(rng, &weights) else { break };
            let player = candidates.remove(index);
            cards.push(CardEvent {
                team: team.to_string(),
                player: player.name.clone(),
            });
        }

        cards
    }

    fn draw_injuries(&self, rng: &mut StdRng, team: &str, lineup: &[&Player], intensity: f64) -> Vec<InjuryEvent> {
        let count = sample_poisson(rng, self.tuning.injury_rate * intensity, lineup.len() as u32);
        let mut candidates: Vec<&Player> = lineup.to_vec();
        let mut injuries = Vec::new();
        let max_recovery = self.tuning.max_recovery_rounds.max(1);

        for _ in 0..count {
            if candidates.is_empty() {
                break;
            }
            let player = candidates.remove(rng.random_range(0..candidates.len()));
            injuries.push(InjuryEvent {
                team: team.to_string(),
                player: player.name.clone(),
                recovery_rounds: rng.random_range(1..=max_recovery),
            });
        }

        injuries
    }
}

/// Average physical score of everyone on the pitch, relative to 70.
fn match_intensity(home: &[&Player], away: &[&Player]) -> f64 {
    let players: Vec<&&Player> = home.iter().chain(away.iter()).collect();
    if players.is_empty() {
        return 1.0;
    }
    let physical: f64 = players.iter().map(|p| p.attributes.physical as f64).sum();
    (physical / players.len() as f64) / 70.0
}

/// Scorer drawn over attacking players in proportion to shooting and
/// technique, falling back to outfielders and then to anyone fielded.
fn pick_scorer(rng: &mut StdRng, lineup: &[&Player]) -> Option<String> {
    let attackers: Vec<&Player> = lineup.iter().filter(|p| p.position.is_attacking()).copied().collect();
    let pool = if !attackers.is_empty() {
        attackers
    } else {
        let outfield: Vec<&Player> = lineup
            .iter()
            .filter(|p| p.position != Position::Goalkeeper)
            .copied()
            .collect();
        if outfield.is_empty() { lineup.to_vec() } else { outfield }
    };

    let weights: Vec<f64> = pool
        .iter()
        .map(|p| (p.attributes.shooting as f64 + p.attributes.technique as f64).max(1.0))
        .collect();
    weighted_pick(rng, &weights).map(|i| pool[i].name.clone())
}

fn weighted_pick(rng: &mut StdRng, weights: &[f64]) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    match WeightedIndex::new(weights) {
        Ok(dist) => Some(dist.sample(rng)),
        Err(_) => Some(rng.random_range(0..weights.len())),
    }
}

/// Inverse-CDF draw from Poisson(lambda), capped at `max`.
pub fn sample_poisson(rng: &mut StdRng, lambda: f64, max: u32) -> u32 {
    let dist = match Poisson::new(lambda) {
        Ok(dist) => dist,
        Err(_) => return 0,
    };

    let u: f64 = rng.random();
    let mut k = 0;
    while k < max && dist.cdf(k as u64) < u {
        k += 1;
    }
    k
}
