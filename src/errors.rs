//! Error types for the Wheelhouse game engine
//!
//! Every rejection is local and non-fatal: the command is refused, the session keeps
//! its previous state and the caller may retry.

use crate::games::types::SessionState;

/// Root error type for all Wheelhouse operations
#[derive(Debug, thiserror::Error)]
pub enum WheelhouseError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Command rejections raised by the engines and the session state machine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    #[error("Precondition not met: {0}")]
    PreconditionNotMet(String),

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Not enough participants: need {required}, have {actual}")]
    NotEnoughParticipants { required: usize, actual: usize },
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Table registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),
}

/// History export and restore errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Duplicate sequence id: {0}")]
    DuplicateSequenceId(u64),

    #[error("Sequence id {0} leaves no room for another round")]
    SequenceExhausted(u64),
}

impl From<serde_json::Error> for WheelhouseError {
    fn from(e: serde_json::Error) -> Self {
        WheelhouseError::History(HistoryError::Serialization(e.to_string()))
    }
}

// Convenience type alias for Results
pub type WheelhouseResult<T> = Result<T, WheelhouseError>;

impl ConfigurationError {
    pub(crate) fn invalid(field: &str, value: impl ToString, reason: &str) -> Self {
        ConfigurationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let game_error = GameError::InsufficientFunds {
            requested: 500,
            available: 120,
        };
        let root: WheelhouseError = game_error.into();

        assert!(root.to_string().contains("Game error"));
        assert!(root.to_string().contains("requested 500"));
        assert!(root.to_string().contains("available 120"));
    }

    #[test]
    fn test_invalid_state_mentions_state() {
        let err = GameError::InvalidState {
            operation: "place a bet",
            state: SessionState::Spinning,
        };
        assert_eq!(err.to_string(), "Cannot place a bet while spinning");
    }

    #[test]
    fn test_error_conversion() {
        let config_error = ConfigurationError::invalid("lottery.min_participants", 1, "must be at least 2");
        let root: WheelhouseError = config_error.into();

        match root {
            WheelhouseError::Configuration(_) => {}
            _ => panic!("Expected configuration error"),
        }
    }

    #[test]
    fn test_json_errors_are_history_errors() {
        let json_error = serde_json::from_str::<u64>("{").unwrap_err();
        let root: WheelhouseError = json_error.into();
        assert!(matches!(root, WheelhouseError::History(HistoryError::Serialization(_))));
    }

    #[test]
    fn test_error_source() {
        let root: WheelhouseError = RegistryError::TableNotFound("t-1".to_string()).into();
        assert!(root.source().is_some());
    }
}
