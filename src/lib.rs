//! Wheelhouse - outcome and settlement engine for roulette tables and fortune-wheel lotteries
//!
//! Two engines share one random source and one session state machine:
//! - single-zero roulette with straight, color and range bets
//! - winner-take-all lottery with a uniform draw over participants
//!
//! Presentation layers drive sessions through commands and read results back
//! from the session history or its event channel.

pub mod config;
pub mod errors;
pub mod games;
pub mod registry;

pub use config::{ConfigLoader, LotteryConfig, RouletteConfig, WheelhouseConfig};
pub use errors::{GameError, HistoryError, WheelhouseError, WheelhouseResult};
pub use games::{
    Bet, BetKind, Color, GameSession, HistoryEntry, HistoryLog, LotterySession, Participant,
    RoundResult, RouletteSession, SessionEvent, SessionState, Slot,
};
pub use registry::TableRegistry;
