//! Registry of independent table and lottery sessions.
//!
//! Each session sits behind its own mutex; commands against one table are serialized
//! while other tables proceed untouched.

use crate::config::WheelhouseConfig;
use crate::errors::RegistryError;
use crate::games::rng::{RngSource, SeededRng, SystemRng};
use crate::games::session::{GameSession, LotterySession, RouletteSession};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub type SharedRoulette = Arc<Mutex<RouletteSession>>;
pub type SharedLottery = Arc<Mutex<LotterySession>>;

#[derive(Clone)]
enum Table {
    Roulette(SharedRoulette),
    Lottery(SharedLottery),
}

/// Thread-safe map of table id to session
pub struct TableRegistry {
    config: WheelhouseConfig,
    tables: DashMap<String, Table>,
    base_seed: Option<u64>,
    opened: AtomicU64,
}

impl TableRegistry {
    pub fn new(config: WheelhouseConfig) -> Self {
        Self {
            config,
            tables: DashMap::new(),
            base_seed: None,
            opened: AtomicU64::new(0),
        }
    }

    /// Derive every table's generator from `seed` for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.base_seed = Some(seed);
        self
    }

    fn next_rng(&self) -> Box<dyn RngSource> {
        let ordinal = self.opened.fetch_add(1, Ordering::SeqCst);
        match self.base_seed {
            Some(seed) => Box::new(SeededRng::new(seed ^ ordinal.wrapping_mul(0x9e37_79b9_7f4a_7c15))),
            None => Box::new(SystemRng::new()),
        }
    }

    fn insert(&self, id: &str, make: impl FnOnce() -> Table) -> Result<Table, RegistryError> {
        match self.tables.entry(id.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::TableExists(id.to_string())),
            Entry::Vacant(slot) => {
                let table = make();
                slot.insert(table.clone());
                Ok(table)
            }
        }
    }

    pub fn open_roulette(&self, id: &str) -> Result<SharedRoulette, RegistryError> {
        let table = self.insert(id, || {
            let session = GameSession::roulette(&self.config.roulette, self.next_rng());
            Table::Roulette(Arc::new(Mutex::new(session)))
        })?;
        info!(table = id, "Roulette table opened");
        match table {
            Table::Roulette(session) => Ok(session),
            Table::Lottery(_) => Err(RegistryError::TableExists(id.to_string())),
        }
    }

    pub fn open_lottery(&self, id: &str) -> Result<SharedLottery, RegistryError> {
        let table = self.insert(id, || {
            let session = GameSession::lottery(&self.config.lottery, self.next_rng());
            Table::Lottery(Arc::new(Mutex::new(session)))
        })?;
        info!(table = id, "Lottery opened");
        match table {
            Table::Lottery(session) => Ok(session),
            Table::Roulette(_) => Err(RegistryError::TableExists(id.to_string())),
        }
    }

    pub fn roulette(&self, id: &str) -> Result<SharedRoulette, RegistryError> {
        match self.tables.get(id).map(|t| t.value().clone()) {
            Some(Table::Roulette(session)) => Ok(session),
            _ => Err(RegistryError::TableNotFound(id.to_string())),
        }
    }

    pub fn lottery(&self, id: &str) -> Result<SharedLottery, RegistryError> {
        match self.tables.get(id).map(|t| t.value().clone()) {
            Some(Table::Lottery(session)) => Ok(session),
            _ => Err(RegistryError::TableNotFound(id.to_string())),
        }
    }

    /// Drop a table. Holders of its handle keep a working session.
    pub fn close(&self, id: &str) -> Result<(), RegistryError> {
        self.tables
            .remove(id)
            .map(|_| info!(table = id, "Table closed"))
            .ok_or_else(|| RegistryError::TableNotFound(id.to_string()))
    }

    /// Sorted table ids
    pub fn table_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tables.iter().map(|t| t.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
