//! Winner-take-all lottery.
//!
//! Every registered participant has the same chance of winning regardless of stake;
//! stakes only decide the size of the pot. There is no central balance in this mode.

use crate::config::LotteryConfig;
use crate::errors::GameError;
use crate::games::rng::RngSource;
use crate::games::session::RoundEngine;
use crate::games::types::{GameType, LotteryOutcome, Participant, RoundResult};
use tracing::debug;
use uuid::Uuid;

/// Smallest field a draw is defined for
pub const MIN_PARTICIPANTS: usize = 2;

/// Sum of all stakes
pub fn pot_of(participants: &[Participant]) -> u64 {
    participants
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.stake))
}

/// Pick one winner uniformly by identity and award the whole pot
pub fn draw(participants: &[Participant], rng: &mut dyn RngSource) -> Result<LotteryOutcome, GameError> {
    if participants.len() < MIN_PARTICIPANTS {
        return Err(GameError::NotEnoughParticipants {
            required: MIN_PARTICIPANTS,
            actual: participants.len(),
        });
    }

    let count = u32::try_from(participants.len()).map_err(|_| {
        GameError::InvalidArgument(format!("{} participants exceed the draw range", participants.len()))
    })?;
    let idx = rng.draw(count)? as usize;

    Ok(LotteryOutcome {
        winner: participants[idx].clone(),
        pot: pot_of(participants),
        participant_count: participants.len(),
    })
}

/// Registered entrants for the next draw
#[derive(Debug, Clone)]
pub struct LotteryPool {
    participants: Vec<Participant>,
    min_participants: usize,
    max_nickname_len: usize,
}

impl LotteryPool {
    pub fn new(config: &LotteryConfig) -> Self {
        Self {
            participants: Vec::new(),
            min_participants: config.min_participants.max(MIN_PARTICIPANTS),
            max_nickname_len: config.max_nickname_len,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn pot(&self) -> u64 {
        pot_of(&self.participants)
    }

    /// Register an entrant. The nickname is trimmed before validation.
    pub fn add(&mut self, nickname: &str, stake: u64) -> Result<Participant, GameError> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(GameError::InvalidArgument("nickname must not be empty".to_string()));
        }
        let length = nickname.chars().count();
        if length > self.max_nickname_len {
            return Err(GameError::InvalidArgument(format!(
                "nickname is {} characters, limit is {}",
                length, self.max_nickname_len
            )));
        }
        if stake == 0 {
            return Err(GameError::InvalidArgument("stake must be positive".to_string()));
        }

        let participant = Participant {
            id: Uuid::new_v4(),
            nickname: nickname.to_string(),
            stake,
        };
        self.participants.push(participant.clone());
        Ok(participant)
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Participant, GameError> {
        let position = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| GameError::InvalidArgument(format!("no participant with id {}", id)))?;
        Ok(self.participants.remove(position))
    }

    pub fn clear(&mut self) {
        self.participants.clear();
    }
}

impl RoundEngine for LotteryPool {
    const GAME: GameType = GameType::Lottery;

    fn spin_precondition(&self) -> Result<(), GameError> {
        if self.participants.len() < self.min_participants {
            return Err(GameError::PreconditionNotMet(format!(
                "need at least {} participants, have {}",
                self.min_participants,
                self.participants.len()
            )));
        }
        Ok(())
    }

    fn settle(&mut self, rng: &mut dyn RngSource) -> Result<RoundResult, GameError> {
        let outcome = draw(&self.participants, rng)?;
        self.participants.clear();

        debug!(
            winner = %outcome.winner.nickname,
            pot = outcome.pot,
            participants = outcome.participant_count,
            "Lottery draw settled"
        );

        Ok(RoundResult::Lottery(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rng::{ScriptedRng, SeededRng};

    fn pool() -> LotteryPool {
        LotteryPool::new(&LotteryConfig::default())
    }

    #[test]
    fn test_add_validates_input() {
        let mut pool = pool();
        assert!(matches!(pool.add("   ", 10), Err(GameError::InvalidArgument(_))));
        assert!(matches!(pool.add("alice", 0), Err(GameError::InvalidArgument(_))));
        assert!(matches!(
            pool.add(&"x".repeat(21), 10),
            Err(GameError::InvalidArgument(_))
        ));
        assert_eq!(pool.participant_count(), 0);

        let added = pool.add("  Мария  ", 10).unwrap();
        assert_eq!(added.nickname, "Мария");
        assert!(pool.add(&"ж".repeat(20), 5).is_ok());
    }

    #[test]
    fn test_pot_and_removal() {
        let mut pool = pool();
        let a = pool.add("A", 100).unwrap();
        pool.add("B", 50).unwrap();
        pool.add("C", 200).unwrap();
        assert_eq!(pool.pot(), 350);

        let removed = pool.remove(a.id).unwrap();
        assert_eq!(removed.nickname, "A");
        assert_eq!(pool.pot(), 250);
        assert!(pool.remove(a.id).is_err());

        pool.clear();
        assert_eq!(pool.participant_count(), 0);
        assert_eq!(pool.pot(), 0);
    }

    #[test]
    fn test_draw_requires_two_participants() {
        let mut pool = pool();
        pool.add("solo", 10).unwrap();
        let mut rng = ScriptedRng::new([0]);

        assert_eq!(
            draw(pool.participants(), &mut rng),
            Err(GameError::NotEnoughParticipants { required: 2, actual: 1 })
        );
        assert!(matches!(
            pool.spin_precondition(),
            Err(GameError::PreconditionNotMet(_))
        ));
    }

    #[test]
    fn test_winner_takes_whole_pot() {
        for pick in 0..3u32 {
            let mut pool = pool();
            pool.add("A", 100).unwrap();
            pool.add("B", 50).unwrap();
            pool.add("C", 200).unwrap();
            let expected = pool.participants()[pick as usize].clone();

            let result = pool.settle(&mut ScriptedRng::new([pick])).unwrap();
            let outcome = result.as_lottery().unwrap();
            assert_eq!(outcome.winner, expected);
            assert_eq!(outcome.pot, 350);
            assert_eq!(outcome.participant_count, 3);
            assert_eq!(pool.participant_count(), 0);
        }
    }

    #[test]
    fn test_win_frequency_ignores_stake() {
        let mut rng = SeededRng::new(2024);
        let mut pool = pool();
        pool.add("whale", 10_000).unwrap();
        pool.add("minnow", 1).unwrap();
        pool.add("middle", 300).unwrap();
        pool.add("other", 42).unwrap();
        let participants = pool.participants().to_vec();

        let draws = 40_000;
        let mut wins = vec![0usize; participants.len()];
        for _ in 0..draws {
            let outcome = draw(&participants, &mut rng).unwrap();
            let idx = participants.iter().position(|p| p.id == outcome.winner.id).unwrap();
            wins[idx] += 1;
        }

        let expected = 1.0 / participants.len() as f64;
        for count in wins {
            let frequency = count as f64 / draws as f64;
            assert!((frequency - expected).abs() < 0.02, "frequency {:.4}", frequency);
        }
    }
}
