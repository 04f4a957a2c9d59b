use rand::rngs::StdRng;
use rand::RngExt;
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{CandidateStatus, ClubKind, Player, Position, ScoutCandidate, TransferRecord};
use crate::roster::roll_player;
use crate::services::Session;

/// The live candidate list and the log of every candidate resolved so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoutBoard {
    pub(crate) candidates: Vec<ScoutCandidate>,
    log: Vec<TransferRecord>,
}

impl ScoutBoard {
    pub fn candidates(&self) -> &[ScoutCandidate] {
        &self.candidates
    }

    pub fn log(&self) -> &[TransferRecord] {
        &self.log
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.candidates.iter().position(|c| c.id == id)
    }

    fn resolve(&mut self, index: usize, status: CandidateStatus, round: u32) -> ScoutCandidate {
        let mut candidate = self.candidates.remove(index);
        candidate.status = status;
        self.log.push(TransferRecord {
            candidate_id: candidate.id,
            player: candidate.player.name.clone(),
            asking_price: candidate.asking_price,
            status,
            round,
        });
        candidate
    }
}

/// Price grows with the player's rating at his position, in steps of 100.
pub fn asking_price(player: &Player) -> u64 {
    let premium = (player.rating() - 40.0).max(1.0) * 200.0;
    ((premium / 100.0).round() * 100.0) as u64
}

/// Candidate ids come from the session stream so a replay reproduces them.
fn candidate_id(rng: &mut StdRng) -> Uuid {
    let bytes: [u8; 16] = rng.random();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

impl Session {
    /// Replace the scout list with freshly rolled candidates. Unresolved
    /// candidates from the previous list expire.
    pub fn refresh_candidates(&mut self) -> &[ScoutCandidate] {
        let round = self.league.current_round;
        while !self.scout.candidates.is_empty() {
            let expired = self.scout.resolve(0, CandidateStatus::Expired, round);
            self.player_names.release(&expired.player.name);
        }

        for _ in 0..self.config.scout_list_size {
            let position = Position::ALL[self.rng.random_range(0..Position::ALL.len())];
            let player = roll_player(&mut self.rng, &mut self.player_names, position);
            let candidate = ScoutCandidate {
                id: candidate_id(&mut self.rng),
                asking_price: asking_price(&player),
                player,
                status: CandidateStatus::Available,
            };
            self.scout.candidates.push(candidate);
        }

        tracing::info!("Scout list refreshed with {} candidates", self.scout.candidates.len());
        self.scout.candidates()
    }

    /// Buy a candidate into the human club. Nothing changes unless the club
    /// can pay the full asking price.
    pub fn sign(&mut self, id: Uuid) -> Result<Player, EngineError> {
        let index = self
            .scout
            .position(id)
            .ok_or_else(|| EngineError::InvalidCandidate(id.to_string()))?;

        let needed = self.scout.candidates[index].asking_price;
        let available = self.funds();
        if needed > available {
            tracing::warn!("Cannot sign {}: costs {}, funds {}", self.scout.candidates[index].player.name, needed, available);
            return Err(EngineError::InsufficientFunds { needed, available });
        }

        let round = self.league.current_round;
        let candidate = self.scout.resolve(index, CandidateStatus::Signed, round);
        let club = self.human_mut();
        if let ClubKind::Human { funds } = &mut club.kind {
            *funds -= needed;
        }

        let mut player = candidate.player;
        player.club = Some(club.name.clone());
        club.players.push(player.clone());

        tracing::info!("Signed {} for {} ({} left)", player.name, needed, self.funds());
        Ok(player)
    }

    /// Turn a candidate down; funds are untouched.
    pub fn reject(&mut self, id: Uuid) -> Result<ScoutCandidate, EngineError> {
        let index = self
            .scout
            .position(id)
            .ok_or_else(|| EngineError::InvalidCandidate(id.to_string()))?;

        let round = self.league.current_round;
        let candidate = self.scout.resolve(index, CandidateStatus::Rejected, round);
        self.player_names.release(&candidate.player.name);

        tracing::info!("Rejected {}", candidate.player.name);
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attributes;
    use crate::services::session::tests::test_session;

    fn set_funds(session: &mut Session, amount: u64) {
        session.human_mut().kind = ClubKind::Human { funds: amount };
    }

    #[test]
    fn test_asking_price_tracks_quality() {
        let mut player = Player {
            name: "Price Check".to_string(),
            position: Position::Forward,
            age: 24,
            nationality: "Spain".to_string(),
            attributes: Attributes::uniform(70),
            club: None,
            appearances: 0,
            goals: 0,
            yellow_cards: 0,
        };
        assert_eq!(asking_price(&player), 6_000);

        player.attributes = Attributes::uniform(30);
        assert_eq!(asking_price(&player), 200);

        player.attributes = Attributes::uniform(85);
        assert!(asking_price(&player) > 6_000);
        assert_eq!(asking_price(&player) % 100, 0);
    }

    #[test]
    fn test_refresh_replaces_the_list() {
        let mut session = test_session(42);
        let first: Vec<Uuid> = session.refresh_candidates().iter().map(|c| c.id).collect();
        assert_eq!(first.len(), 5);
        assert!(session.candidates().iter().all(|c| c.player.club.is_none()));
        assert!(session.candidates().iter().all(|c| c.status == CandidateStatus::Available));

        let second: Vec<Uuid> = session.refresh_candidates().iter().map(|c| c.id).collect();
        assert_eq!(second.len(), 5);
        assert!(first.iter().all(|id| !second.contains(id)));

        assert_eq!(session.transfers().len(), 5);
        assert!(session.transfers().iter().all(|t| t.status == CandidateStatus::Expired));
    }

    #[test]
    fn test_candidate_names_are_globally_unique() {
        let mut session = test_session(12);
        session.refresh_candidates();
        for candidate in session.candidates() {
            assert!(session.teams().iter().all(|t| t.player(&candidate.player.name).is_none()));
        }
    }

    #[test]
    fn test_sign_moves_player_and_money() {
        let mut session = test_session(42);
        session.refresh_candidates();
        set_funds(&mut session, 5_000);
        session.scout.candidates[0].asking_price = 5_000;
        let id = session.candidates()[0].id;
        let squad = session.human().players.len();

        let player = session.sign(id).unwrap();
        assert_eq!(session.funds(), 0);
        assert_eq!(session.human().players.len(), squad + 1);
        assert_eq!(player.club.as_deref(), Some("Rustport Athletic"));
        assert!(session.human().player(&player.name).is_some());
        assert_eq!(session.candidates().len(), 4);
        assert_eq!(session.transfers().last().map(|t| t.status), Some(CandidateStatus::Signed));

        // Signed ids are gone from the list
        assert_eq!(session.sign(id).unwrap_err(), EngineError::InvalidCandidate(id.to_string()));
    }

    #[test]
    fn test_insufficient_funds_changes_nothing() {
        let mut session = test_session(42);
        session.refresh_candidates();
        set_funds(&mut session, 100);
        let id = session.candidates()[0].id;
        let price = session.candidates()[0].asking_price;
        let before = serde_json::to_string(&session.snapshot()).unwrap();

        let err = session.sign(id).unwrap_err();
        assert_eq!(err, EngineError::InsufficientFunds { needed: price, available: 100 });
        assert_eq!(serde_json::to_string(&session.snapshot()).unwrap(), before);
    }

    #[test]
    fn test_reject_frees_the_slot_without_cost() {
        let mut session = test_session(42);
        session.refresh_candidates();
        let id = session.candidates()[2].id;

        let rejected = session.reject(id).unwrap();
        assert_eq!(rejected.status, CandidateStatus::Rejected);
        assert_eq!(session.funds(), 30_000);
        assert_eq!(session.candidates().len(), 4);
        let name = rejected.player.name.clone();
        assert_eq!(session.player_names.claim(&name), name);
        assert!(matches!(session.reject(id), Err(EngineError::InvalidCandidate(_))));
    }

    #[test]
    fn test_unknown_id_is_invalid() {
        let mut session = test_session(42);
        session.refresh_candidates();
        let before = session.snapshot();
        assert!(matches!(session.sign(Uuid::nil()), Err(EngineError::InvalidCandidate(_))));
        assert_eq!(session.snapshot(), before);
    }
}
