//! Bounded round history with JSON export and restore

use crate::errors::{HistoryError, WheelhouseResult};
use crate::games::types::{HistoryEntry, RoundResult};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Bounded, append-only record of settled rounds.
///
/// Once full, the oldest entry is evicted before each insert. Sequence ids keep
/// counting across evictions.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
    next_sequence_id: u64,
}

impl HistoryLog {
    /// A zero capacity is raised to one; configuration validation rejects it earlier.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            next_sequence_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an already-built entry, evicting the oldest when at capacity
    pub fn append(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.next_sequence_id = self
            .next_sequence_id
            .max(entry.sequence_id.saturating_add(1));
        self.entries.push_back(entry);
    }

    /// Stamp a settled result with the next sequence id and append it
    pub fn record(&mut self, result: RoundResult, timestamp: DateTime<Utc>) -> HistoryEntry {
        let entry = HistoryEntry {
            result,
            timestamp,
            sequence_id: self.next_sequence_id,
        };
        self.append(entry.clone());
        entry
    }

    /// Most recent first
    pub fn list(&self) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().collect()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Oldest-first JSON array of entries
    pub fn to_json(&self) -> WheelhouseResult<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Rebuild a log from `to_json` output, keeping the newest `capacity` entries
    pub fn from_json(capacity: usize, json: &str) -> WheelhouseResult<Self> {
        let mut entries: Vec<HistoryEntry> = serde_json::from_str(json)?;
        entries.sort_by_key(|entry| entry.sequence_id);
        if let Some(pair) = entries.windows(2).find(|w| w[0].sequence_id == w[1].sequence_id) {
            return Err(HistoryError::DuplicateSequenceId(pair[0].sequence_id).into());
        }
        if let Some(last) = entries.last() {
            if last.sequence_id.checked_add(1).is_none() {
                return Err(HistoryError::SequenceExhausted(last.sequence_id).into());
            }
        }

        let mut log = Self::new(capacity);
        for entry in entries {
            log.append(entry);
        }
        Ok(log)
    }
}
