//! Configuration with defaults, presets and validation
//!
//! Values come from defaults, an optional TOML file, then `WHEELHOUSE_*` environment overrides.

use crate::errors::{ConfigurationError, WheelhouseResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WheelhouseConfig {
    pub roulette: RouletteConfig,
    pub lottery: LotteryConfig,
    pub logging: LoggingConfig,
}

/// Roulette table settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouletteConfig {
    pub starting_balance: u64,
    pub history_capacity: usize,
    /// Chip denominations offered to the player
    pub chip_values: Vec<u64>,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            starting_balance: 10_000,
            history_capacity: 10,
            chip_values: vec![10, 50, 100, 500, 1000],
        }
    }
}

/// Lottery settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LotteryConfig {
    pub history_capacity: usize,
    pub min_participants: usize,
    pub max_nickname_len: usize,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            history_capacity: 20,
            min_participants: 2,
            max_nickname_len: 20,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl WheelhouseConfig {
    /// Deep bankroll and long history for trying strategies
    pub fn practice() -> Self {
        Self {
            roulette: RouletteConfig {
                starting_balance: 1_000_000,
                history_capacity: 100,
                ..Default::default()
            },
            lottery: LotteryConfig {
                history_capacity: 100,
                ..Default::default()
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
        }
    }

    /// Short bankroll, larger fields
    pub fn tournament() -> Self {
        Self {
            roulette: RouletteConfig {
                starting_balance: 1_000,
                history_capacity: 10,
                chip_values: vec![10, 25, 100],
            },
            lottery: LotteryConfig {
                history_capacity: 20,
                min_participants: 4,
                max_nickname_len: 16,
            },
            ..Default::default()
        }
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.roulette.history_capacity == 0 {
            return Err(ConfigurationError::invalid(
                "roulette.history_capacity",
                0,
                "history capacity must be > 0",
            ));
        }

        if self.roulette.chip_values.is_empty() {
            return Err(ConfigurationError::invalid(
                "roulette.chip_values",
                "[]",
                "at least one chip value is required",
            ));
        }

        if self.roulette.chip_values.contains(&0) {
            return Err(ConfigurationError::invalid(
                "roulette.chip_values",
                format!("{:?}", self.roulette.chip_values),
                "chip values must be positive",
            ));
        }

        if self.lottery.history_capacity == 0 {
            return Err(ConfigurationError::invalid(
                "lottery.history_capacity",
                0,
                "history capacity must be > 0",
            ));
        }

        if self.lottery.min_participants < 2 {
            return Err(ConfigurationError::invalid(
                "lottery.min_participants",
                self.lottery.min_participants,
                "a draw needs at least 2 participants",
            ));
        }

        if self.lottery.max_nickname_len == 0 {
            return Err(ConfigurationError::invalid(
                "lottery.max_nickname_len",
                0,
                "nicknames need room for at least one character",
            ));
        }

        Ok(())
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> WheelhouseResult<WheelhouseConfig> {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => WheelhouseConfig::default(),
        };

        self.apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> WheelhouseResult<WheelhouseConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut WheelhouseConfig) -> WheelhouseResult<()> {
        if let Some(balance) = env_number::<u64>("WHEELHOUSE_STARTING_BALANCE")? {
            config.roulette.starting_balance = balance;
        }
        if let Some(capacity) = env_number::<usize>("WHEELHOUSE_ROULETTE_HISTORY")? {
            config.roulette.history_capacity = capacity;
        }
        if let Some(capacity) = env_number::<usize>("WHEELHOUSE_LOTTERY_HISTORY")? {
            config.lottery.history_capacity = capacity;
        }
        if let Ok(level) = env::var("WHEELHOUSE_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn env_number<N: std::str::FromStr>(name: &str) -> Result<Option<N>, ConfigurationError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigurationError::invalid(name, &value, "expected a non-negative integer")),
        Err(_) => Ok(None),
    }
}
