// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid transaction state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid user name: {0}")]
    InvalidName(String),

    #[error("Age {0} does not fit the age column")]
    AgeOutOfRange(u32),

    #[error("Invalid schema name '{name}': {reason}")]
    InvalidSchemaName { name: String, reason: String },

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
