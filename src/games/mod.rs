pub mod types;
pub mod rng;
pub mod roulette;
pub mod lottery;
pub mod session;
pub mod history;
pub mod leaderboard;

pub use types::*;
pub use rng::{RngSource, ScriptedRng, SeededRng, SystemRng};
pub use roulette::{RouletteTable, SLOTS};
pub use lottery::LotteryPool;
pub use session::{GameSession, LotterySession, RouletteSession, RoundEngine};
pub use history::HistoryLog;
