//! Shared data model: wheel slots, bets, participants, round results and session events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Supported game modes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Roulette,
    Lottery,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Roulette => write!(f, "roulette"),
            GameType::Lottery => write!(f, "lottery"),
        }
    }
}

/// Pocket color on the wheel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Black => write!(f, "black"),
            Color::Green => write!(f, "green"),
        }
    }
}

/// One of the 37 fixed roulette pockets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Slot {
    pub number: u8,
    pub color: Color,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number, self.color)
    }
}

/// Wager kinds accepted by the roulette table.
///
/// Ordering is by variant, then value, which gives the bet book a stable listing order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BetKind {
    Straight { number: u8 },
    Color { color: Color },
    Range { low: u8, high: u8 },
}

/// A stake on one bet kind for the current round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bet {
    pub kind: BetKind,
    pub amount: u64,
}

/// A bet and what it paid on the drawn slot (0 for a losing bet)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BetLine {
    pub bet: Bet,
    pub payout: u64,
}

/// Registered lottery entrant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: Uuid,
    pub nickname: String,
    pub stake: u64,
}

/// Settled roulette round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouletteOutcome {
    pub slot: Slot,
    pub bets: Vec<BetLine>,
    pub total_staked: u64,
    pub total_payout: u64,
    /// Payout minus stake; negative when the round lost money
    pub net: i64,
}

/// Settled lottery draw
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LotteryOutcome {
    pub winner: Participant,
    pub pot: u64,
    pub participant_count: usize,
}

/// Immutable record produced by settlement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "game", rename_all = "lowercase")]
pub enum RoundResult {
    Roulette(RouletteOutcome),
    Lottery(LotteryOutcome),
}

impl RoundResult {
    pub fn game_type(&self) -> GameType {
        match self {
            RoundResult::Roulette(_) => GameType::Roulette,
            RoundResult::Lottery(_) => GameType::Lottery,
        }
    }

    /// Amount paid out by the round: the roulette total payout or the lottery pot
    pub fn payout(&self) -> u64 {
        match self {
            RoundResult::Roulette(outcome) => outcome.total_payout,
            RoundResult::Lottery(outcome) => outcome.pot,
        }
    }

    pub fn as_roulette(&self) -> Option<&RouletteOutcome> {
        match self {
            RoundResult::Roulette(outcome) => Some(outcome),
            RoundResult::Lottery(_) => None,
        }
    }

    pub fn as_lottery(&self) -> Option<&LotteryOutcome> {
        match self {
            RoundResult::Lottery(outcome) => Some(outcome),
            RoundResult::Roulette(_) => None,
        }
    }
}

/// Entry in a session's history log. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub result: RoundResult,
    pub timestamp: DateTime<Utc>,
    pub sequence_id: u64,
}

/// Explicit lifecycle of a table or lottery session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Spinning,
    Settled,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Spinning => write!(f, "spinning"),
            SessionState::Settled => write!(f, "settled"),
        }
    }
}

/// Events published to the presentation collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RoundSettled(HistoryEntry),
    Acknowledged,
}
