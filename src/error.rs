use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::{AccountId, Amount};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Strategy operation errors.
///
/// Every variant leaves the strategy in its observable pre-call state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// Zero or out-of-range amount, or nothing backing the request.
    #[error("InvalidAmount: {reason}")]
    InvalidAmount { reason: String },

    /// Idle balance cannot cover a deposit.
    #[error("InsufficientBalance: requested {requested}, idle {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    /// A venue, token or vault call did not complete as requested.
    #[error("ExternalCallFailure during {operation}: {reason}")]
    ExternalCallFailure {
        operation: &'static str,
        reason: String,
    },

    #[error("Unauthorized: {caller} may not call {operation}")]
    Unauthorized {
        caller: AccountId,
        operation: &'static str,
    },

    /// Another operation holds the strategy's execution lock.
    #[error("strategy {strategy} is busy with {held_by}")]
    Locked {
        strategy: AccountId,
        held_by: &'static str,
    },

    #[error("migration target {target} rejected: {reason}")]
    MigrationTargetMismatch { target: AccountId, reason: String },
}

impl StrategyError {
    pub(crate) fn invalid_amount(reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            reason: reason.into(),
        }
    }

    pub(crate) fn external(operation: &'static str, reason: impl ToString) -> Self {
        Self::ExternalCallFailure {
            operation,
            reason: reason.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// Raised by lending venue implementations.
    #[error("venue error: {0}")]
    Venue(String),

    /// Raised by token ledger implementations.
    #[error("token error: {0}")]
    Token(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The strategy error inside, if this is one.
    #[must_use]
    pub fn as_strategy(&self) -> Option<&StrategyError> {
        match self {
            Self::Strategy(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
