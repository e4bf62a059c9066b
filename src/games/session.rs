//! Session state machine shared by both game modes.
//!
//! `Idle --spin--> Spinning --settle--> Settled --acknowledge--> Idle`
//!
//! The `Spinning` state is entered before the draw and left only after the history
//! append, so no observer holding the session can see a half-settled round.

use crate::config::{LotteryConfig, RouletteConfig};
use crate::errors::GameError;
use crate::games::history::HistoryLog;
use crate::games::lottery::LotteryPool;
use crate::games::rng::RngSource;
use crate::games::roulette::RouletteTable;
use crate::games::types::{
    Bet, BetKind, GameType, HistoryEntry, Participant, RoundResult, SessionEvent, SessionState,
};
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

const EVENT_BUFFER: usize = 64;

/// Outcome engine a session can drive
pub trait RoundEngine: Send {
    const GAME: GameType;

    /// Checked before entering `Spinning`; an error keeps the session idle.
    fn spin_precondition(&self) -> Result<(), GameError>;

    /// Draw exactly once, compute the result and clear the round's transient state.
    fn settle(&mut self, rng: &mut dyn RngSource) -> Result<RoundResult, GameError>;
}

/// One table or lottery session with its own history and random source
pub struct GameSession<T: RoundEngine> {
    engine: T,
    state: SessionState,
    rng: Box<dyn RngSource>,
    history: HistoryLog,
    last_result: Option<RoundResult>,
    events: broadcast::Sender<SessionEvent>,
}

pub type RouletteSession = GameSession<RouletteTable>;
pub type LotterySession = GameSession<LotteryPool>;

impl<T: RoundEngine> GameSession<T> {
    pub fn new(engine: T, rng: Box<dyn RngSource>, history_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            engine,
            state: SessionState::Idle,
            rng,
            history: HistoryLog::new(history_capacity),
            last_result: None,
            events,
        }
    }

    /// Replace the empty history with a restored one
    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = history;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn engine(&self) -> &T {
        &self.engine
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    /// Most recent first
    pub fn history(&self) -> Vec<&HistoryEntry> {
        self.history.list()
    }

    pub fn history_log(&self) -> &HistoryLog {
        &self.history
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Move a settled session back to idle. A no-op when already idle.
    pub fn acknowledge(&mut self) -> Result<(), GameError> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Spinning => Err(self.reject("acknowledge")),
            SessionState::Settled => {
                self.state = SessionState::Idle;
                // Nobody listening is fine
                let _ = self.events.send(SessionEvent::Acknowledged);
                debug!(game = %T::GAME, "Result acknowledged");
                Ok(())
            }
        }
    }

    /// Enter `Spinning` if the engine's precondition holds
    pub fn begin_spin(&mut self) -> Result<(), GameError> {
        self.command("spin", |engine| {
            engine.spin_precondition().map_err(|e| {
                debug!(game = %T::GAME, error = %e, "Spin refused");
                e
            })
        })?;
        self.state = SessionState::Spinning;
        debug!(game = %T::GAME, "Spin started");
        Ok(())
    }

    /// Draw, settle, record history and move to `Settled`
    pub fn finish_spin(&mut self) -> Result<RoundResult, GameError> {
        if self.state != SessionState::Spinning {
            return Err(GameError::InvalidState {
                operation: "finish a spin",
                state: self.state,
            });
        }

        let result = match self.engine.settle(self.rng.as_mut()) {
            Ok(result) => result,
            Err(e) => {
                self.state = SessionState::Idle;
                return Err(e);
            }
        };

        let entry = self.history.record(result.clone(), Utc::now());
        self.last_result = Some(result.clone());
        self.state = SessionState::Settled;

        info!(
            game = %T::GAME,
            sequence_id = entry.sequence_id,
            payout = result.payout(),
            "Round settled"
        );
        let _ = self.events.send(SessionEvent::RoundSettled(entry));

        Ok(result)
    }

    /// Run a whole round: `begin_spin` then `finish_spin`
    pub fn spin(&mut self) -> Result<RoundResult, GameError> {
        self.begin_spin()?;
        self.finish_spin()
    }

    /// Run a command against the engine. Spinning sessions refuse; a settled session is
    /// acknowledged only once the command has succeeded, so a rejection leaves it settled.
    fn command<R>(
        &mut self,
        operation: &'static str,
        apply: impl FnOnce(&mut T) -> Result<R, GameError>,
    ) -> Result<R, GameError> {
        if self.state == SessionState::Spinning {
            return Err(self.reject(operation));
        }
        let output = apply(&mut self.engine)?;
        if self.state == SessionState::Settled {
            self.acknowledge()?;
        }
        Ok(output)
    }

    fn reject(&self, operation: &'static str) -> GameError {
        debug!(game = %T::GAME, operation, state = %self.state, "Command rejected");
        GameError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl GameSession<RouletteTable> {
    pub fn roulette(config: &RouletteConfig, rng: Box<dyn RngSource>) -> Self {
        Self::new(RouletteTable::new(config), rng, config.history_capacity)
    }

    pub fn place_bet(&mut self, kind: BetKind, amount: u64) -> Result<Vec<Bet>, GameError> {
        let bets = self.command("place a bet", |table| table.place_bet(kind, amount))?;
        debug!(kind = %kind, amount, "Bet placed");
        Ok(bets)
    }

    /// Refund and drop all active bets. Returns the refunded amount.
    pub fn clear_bets(&mut self) -> Result<u64, GameError> {
        self.command("clear bets", |table| Ok(table.clear_bets()))
    }

    pub fn active_bets(&self) -> Vec<Bet> {
        self.engine.active_bets()
    }

    pub fn balance(&self) -> u64 {
        self.engine.balance()
    }
}

impl GameSession<LotteryPool> {
    pub fn lottery(config: &LotteryConfig, rng: Box<dyn RngSource>) -> Self {
        Self::new(LotteryPool::new(config), rng, config.history_capacity)
    }

    pub fn add_participant(&mut self, nickname: &str, stake: u64) -> Result<Participant, GameError> {
        let participant = self.command("add a participant", |pool| pool.add(nickname, stake))?;
        debug!(id = %participant.id, nickname = %participant.nickname, stake, "Participant added");
        Ok(participant)
    }

    pub fn remove_participant(&mut self, id: Uuid) -> Result<Participant, GameError> {
        self.command("remove a participant", |pool| pool.remove(id))
    }

    pub fn clear_participants(&mut self) -> Result<(), GameError> {
        self.command("clear participants", |pool| {
            pool.clear();
            Ok(())
        })
    }

    pub fn active_participants(&self) -> &[Participant] {
        self.engine.participants()
    }

    pub fn pot(&self) -> u64 {
        self.engine.pot()
    }
}
