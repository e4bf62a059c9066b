//! Lottery leaderboard aggregated from settled draws

use crate::games::history::HistoryLog;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregated lottery winnings for one nickname
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub nickname: String,
    pub total_won: u64,
    pub rounds_won: u32,
}

/// Rank lottery winners found in `history` by total pot won, then nickname.
///
/// Only entries still held by the log count, so the board follows the log's eviction.
pub fn from_history(history: &HistoryLog) -> Vec<LeaderboardRow> {
    let mut totals: HashMap<&str, (u64, u32)> = HashMap::new();
    for entry in history.list() {
        if let Some(outcome) = entry.result.as_lottery() {
            let slot = totals.entry(outcome.winner.nickname.as_str()).or_insert((0, 0));
            slot.0 = slot.0.saturating_add(outcome.pot);
            slot.1 += 1;
        }
    }

    let mut rows: Vec<LeaderboardRow> = totals
        .into_iter()
        .map(|(nickname, (total_won, rounds_won))| LeaderboardRow {
            nickname: nickname.to_string(),
            total_won,
            rounds_won,
        })
        .collect();
    rows.sort_by(|a, b| b.total_won.cmp(&a.total_won).then_with(|| a.nickname.cmp(&b.nickname)));
    rows
}

pub fn top(history: &HistoryLog, n: usize) -> Vec<LeaderboardRow> {
    let mut rows = from_history(history);
    rows.truncate(n);
    rows
}
