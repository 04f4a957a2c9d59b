use crate::error::EngineError;
use crate::models::{MatchResult, RoundSummary, SeasonHistoryEntry};
use crate::services::{CardOutcome, LeagueState, Session};

impl Session {
    /// Play every fixture of the next round and fold the results into the
    /// table, the player counters and the discipline ledger.
    pub fn advance_round(&mut self) -> Result<RoundSummary, EngineError> {
        if self.league.is_complete() {
            tracing::warn!("Refused to advance: all {} rounds played", self.league.total_rounds());
            return Err(EngineError::SeasonComplete);
        }

        let round = self.league.current_round;
        let fixtures = self.league.schedule.round(round).to_vec();
        let mut results = Vec::with_capacity(fixtures.len());

        for fixture in &fixtures {
            let (Some(home), Some(away)) = (self.team_index(&fixture.home), self.team_index(&fixture.away)) else {
                continue;
            };
            let result = self.engine.simulate(
                &self.teams[home],
                &self.teams[away],
                round,
                &self.ledger,
                &mut self.rng,
            );
            self.apply_result(&result);
            results.push(result);
        }

        debug_assert_eq!(self.league.table.total_goals_for(), self.league.table.total_goals_against());

        let byes = self.league.schedule.byes(round);
        self.league.record_round(SeasonHistoryEntry {
            round,
            results: results.clone(),
            byes,
        });
        self.ledger.advance_to(self.league.current_round);

        let standings = self.table();
        let season_complete = self.league.is_complete();

        let goals: u32 = results.iter().map(|r| r.home_goals + r.away_goals).sum();
        tracing::info!("Round {} played: {} matches, {} goals", round, results.len(), goals);
        if season_complete {
            if let Some(champion) = standings.first() {
                tracing::info!("Season complete, {} win the league on {} points", champion.team, champion.points);
            }
        }

        Ok(RoundSummary {
            round,
            results,
            standings,
            season_complete,
        })
    }

    fn apply_result(&mut self, result: &MatchResult) {
        self.league.table.apply(result);

        for (team, lineup) in [(&result.home, &result.home_lineup), (&result.away, &result.away_lineup)] {
            for name in lineup {
                if let Some(player) = self.player_mut(team, name) {
                    player.appearances += 1;
                }
            }
        }

        for goal in &result.goals {
            if let Some(scorer) = &goal.scorer {
                if let Some(player) = self.player_mut(&goal.team, scorer) {
                    player.goals += 1;
                }
            }
        }

        for card in &result.cards {
            self.book_yellow(&card.team, &card.player, result.round);
        }

        for injury in &result.injuries {
            let until = self.ledger.record_injury(&injury.player, result.round, injury.recovery_rounds);
            tracing::info!("{} ({}) injured, out until round {}", injury.player, injury.team, until);
        }
    }

    /// Count a yellow card shown in `round`. A suspension falls on the
    /// club's next fixture, so a bye never serves it.
    pub(crate) fn book_yellow(&mut self, team: &str, player: &str, round: u32) -> CardOutcome {
        if let Some(booked) = self.player_mut(team, player) {
            booked.yellow_cards += 1;
        }

        let next_match = self
            .league
            .schedule
            .next_fixture_round(team, round)
            .unwrap_or(round + 1);
        let outcome = self.ledger.record_yellow(player, next_match);
        if let CardOutcome::Suspended { round: banned } = outcome {
            tracing::info!("{} ({}) suspended for round {}", player, team, banned);
        }
        outcome
    }

    /// Start the season over with the same clubs and schedule. Signings,
    /// funds and the random stream carry on.
    pub fn reset_season(&mut self) {
        for player in self.teams.iter_mut().flat_map(|t| t.players.iter_mut()) {
            player.reset_season_counters();
        }
        self.ledger.reset();

        let names: Vec<String> = self.teams.iter().map(|t| t.name.clone()).collect();
        self.league = LeagueState::new(&names);

        tracing::info!("Season reset: {} rounds to play", self.league.total_rounds());
    }
}

#[cfg(test)]
mod tests {
    use crate::error::EngineError;
    use crate::models::{MatchOutcome, PlayerStatus, RoundSummary, SeasonPhase};
    use crate::services::session::tests::{quiet_session, test_session};
    use crate::services::CardOutcome;
    use std::collections::BTreeMap;

    const CLUB: &str = "Rustport Athletic";

    #[test]
    fn test_round_one_points_match_outcomes() {
        let mut session = test_session(42);
        let summary = session.advance_round().unwrap();
        assert_eq!(summary.round, 1);
        assert_eq!(summary.results.len(), 4);

        let draws = summary.results.iter().filter(|r| r.outcome() == MatchOutcome::Draw).count() as u32;
        let decisive = summary.results.len() as u32 - draws;
        let total_points: u32 = summary.standings.iter().map(|r| r.points).sum();
        assert_eq!(total_points, 3 * decisive + 2 * draws);
        assert_eq!(session.phase(), SeasonPhase::InProgress { next_round: 2 });
    }

    #[test]
    fn test_goal_totals_balance_every_round() {
        let mut session = test_session(7);
        while session.phase() != SeasonPhase::Complete {
            let summary = session.advance_round().unwrap();
            let scored: u32 = summary.standings.iter().map(|r| r.goals_for).sum();
            let conceded: u32 = summary.standings.iter().map(|r| r.goals_against).sum();
            assert_eq!(scored, conceded);

            for result in &summary.results {
                let home = summary.standings.iter().find(|r| r.team == result.home).unwrap();
                assert_eq!(home.played, summary.round);
                assert_eq!(result.goals.len() as u32, result.home_goals + result.away_goals);
            }
        }
    }

    #[test]
    fn test_points_follow_three_one_zero() {
        let mut session = test_session(13);
        for _ in 0..session.total_rounds() {
            session.advance_round().unwrap();
        }

        for row in session.table() {
            assert_eq!(row.points, 3 * row.wins + row.draws);
            assert_eq!(row.played, row.wins + row.draws + row.losses);
            assert_eq!(row.played, 14);
        }
        let mut wins = 0;
        let mut losses = 0;
        for row in session.table() {
            wins += row.wins;
            losses += row.losses;
        }
        assert_eq!(wins, losses);
    }

    #[test]
    fn test_counters_track_lineups_and_goals() {
        let mut session = test_session(5);
        let counters = |session: &crate::services::Session| -> BTreeMap<String, (u32, u32, u32)> {
            session
                .teams()
                .iter()
                .flat_map(|t| t.players.iter())
                .map(|p| (p.name.clone(), (p.appearances, p.goals, p.yellow_cards)))
                .collect()
        };
        let before = counters(&session);
        let summary = session.advance_round().unwrap();
        let after = counters(&session);

        let fielded: Vec<&String> = summary
            .results
            .iter()
            .flat_map(|r| r.home_lineup.iter().chain(r.away_lineup.iter()))
            .collect();
        for (name, (apps, _, _)) in &after {
            let expected = before[name].0 + u32::from(fielded.contains(&name));
            assert_eq!(*apps, expected, "{}", name);
        }

        let goals_gained: u32 = after.iter().map(|(n, c)| c.1 - before[n].1).sum();
        let credited = summary
            .results
            .iter()
            .flat_map(|r| r.goals.iter())
            .filter(|g| g.scorer.is_some())
            .count() as u32;
        assert_eq!(goals_gained, credited);

        let cards_gained: u32 = after.iter().map(|(n, c)| c.2 - before[n].2).sum();
        let cards = summary.results.iter().map(|r| r.cards.len() as u32).sum::<u32>();
        assert_eq!(cards_gained, cards);
    }

    #[test]
    fn test_season_complete_refuses_further_rounds() {
        let mut session = test_session(1);
        for round in 1..=14 {
            let summary = session.advance_round().unwrap();
            assert_eq!(summary.season_complete, round == 14);
        }
        assert_eq!(session.phase(), SeasonPhase::Complete);

        let before = serde_json::to_string(&session.snapshot()).unwrap();
        assert_eq!(session.advance_round().unwrap_err(), EngineError::SeasonComplete);
        assert_eq!(serde_json::to_string(&session.snapshot()).unwrap(), before);
        assert_eq!(session.history().len(), 14);
    }

    fn fielded(summary: &RoundSummary, team: &str, player: &str) -> Option<bool> {
        summary
            .results
            .iter()
            .find(|r| r.involves(team))
            .map(|r| r.home_lineup.iter().chain(r.away_lineup.iter()).any(|p| p == player))
    }

    #[test]
    fn test_suspension_skips_exactly_the_next_round() {
        let mut session = quiet_session(21, 7);
        for _ in 0..3 {
            session.book_yellow(CLUB, "Di Striker", 1);
        }
        assert_eq!(session.ledger.accumulated("Di Striker"), 0);
        assert_eq!(session.human().player("Di Striker").unwrap().yellow_cards, 3);

        let round_one = session.advance_round().unwrap();
        assert_eq!(fielded(&round_one, CLUB, "Di Striker"), Some(true));
        assert!(session.ledger.is_suspended("Di Striker", 2));

        let round_two = session.advance_round().unwrap();
        assert_eq!(fielded(&round_two, CLUB, "Di Striker"), Some(false));
        assert!(!session.ledger.is_suspended("Di Striker", 3));
        assert!(!matches!(session.player_status("Di Striker"), PlayerStatus::Suspended { .. }));

        let round_three = session.advance_round().unwrap();
        assert_eq!(fielded(&round_three, CLUB, "Di Striker"), Some(true));
    }

    #[test]
    fn test_suspension_is_served_in_a_match_not_a_bye() {
        let mut session = quiet_session(17, 4);
        let schedule = session.league.schedule.clone();

        // A round the club plays, followed by a round it sits out
        let idle = |round: u32| schedule.byes(round).iter().any(|t| t == CLUB);
        let carded_round = (1..schedule.total_rounds())
            .find(|&r| !idle(r) && idle(r + 1))
            .unwrap();
        let next_match = schedule.next_fixture_round(CLUB, carded_round).unwrap();
        assert!(next_match > carded_round + 1);

        for _ in 1..carded_round {
            session.advance_round().unwrap();
        }
        let mut outcome = CardOutcome::Warning { accumulated: 0 };
        for _ in 0..3 {
            outcome = session.book_yellow(CLUB, "Di Striker", carded_round);
        }
        assert_eq!(outcome, CardOutcome::Suspended { round: next_match });

        session.advance_round().unwrap();
        let bye = session.advance_round().unwrap();
        assert_eq!(fielded(&bye, CLUB, "Di Striker"), None);
        assert!(matches!(session.player_status("Di Striker"), PlayerStatus::Suspended { .. }));

        for _ in carded_round + 2..next_match {
            session.advance_round().unwrap();
        }
        let served = session.advance_round().unwrap();
        assert_eq!(served.round, next_match);
        assert_eq!(fielded(&served, CLUB, "Di Striker"), Some(false));

        if let Some(back) = schedule.next_fixture_round(CLUB, next_match) {
            for _ in next_match + 1..back {
                session.advance_round().unwrap();
            }
            let summary = session.advance_round().unwrap();
            assert_eq!(fielded(&summary, CLUB, "Di Striker"), Some(true));
        }
    }

    #[test]
    fn test_injured_players_sit_out_until_recovered() {
        let mut session = quiet_session(9, 7);
        let until = session.ledger.record_injury("Cy Engine", 1, 2);
        assert_eq!(until, 4);

        for _ in 0..3 {
            let summary = session.advance_round().unwrap();
            assert_eq!(fielded(&summary, CLUB, "Cy Engine"), Some(false));
        }
        let cy = session.human().player("Cy Engine").unwrap();
        assert_eq!(cy.appearances, 3);

        let round_four = session.advance_round().unwrap();
        assert_eq!(fielded(&round_four, CLUB, "Cy Engine"), Some(true));
        assert_eq!(session.human().player("Cy Engine").unwrap().appearances, 4);
    }

    #[test]
    fn test_reset_starts_a_fresh_season() {
        let mut session = test_session(4);
        for _ in 0..5 {
            session.advance_round().unwrap();
        }
        let schedule = session.league.schedule.clone();

        session.reset_season();
        assert_eq!(session.phase(), SeasonPhase::NotStarted);
        assert_eq!(session.current_round(), 1);
        assert!(session.history().is_empty());
        assert!(session.ledger_entries().is_empty());
        assert!(session.table().iter().all(|r| r.played == 0 && r.points == 0));
        assert!(session
            .teams()
            .iter()
            .flat_map(|t| t.players.iter())
            .all(|p| p.appearances == 0 && p.goals == 0 && p.yellow_cards == 0));
        assert_eq!(session.league.schedule, schedule);
        assert_eq!(session.funds(), 30_000);

        assert!(session.advance_round().is_ok());
    }

    #[test]
    fn test_same_seed_replays_the_same_season() {
        let play = |seed: u64| {
            let mut session = test_session(seed);
            session.refresh_candidates();
            while session.advance_round().is_ok() {}
            serde_json::to_string(&session.snapshot()).unwrap()
        };
        assert_eq!(play(77), play(77));
        assert_ne!(play(77), play(78));
    }

    #[test]
    fn test_odd_league_records_byes() {
        let config = crate::config::EngineConfig {
            ai_clubs: 4,
            ..Default::default()
        };
        let mut session = crate::services::Session::new(config, vec![]);
        assert_eq!(session.total_rounds(), 10);

        let summary = session.advance_round().unwrap();
        assert_eq!(summary.results.len(), 2);
        assert_eq!(session.history()[0].byes.len(), 1);
        let bye = &session.history()[0].byes[0];
        assert_eq!(session.table().iter().find(|r| &r.team == bye).unwrap().played, 0);
    }
}
