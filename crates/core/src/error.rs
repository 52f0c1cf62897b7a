// Central Error Type for the Application

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Diagnostic details reported by the store for a failed operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreError {
    /// Provider-specific code (MySQL error number, SQLite extended result code)
    pub code: Option<String>,
    /// Five-character SQLSTATE, when the provider reports one
    pub sql_state: Option<String>,
    pub message: String,
}

impl StoreError {
    pub fn new(
        code: Option<String>,
        sql_state: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            sql_state,
            message: message.into(),
        }
    }

    /// Error raised by the client library itself (no server diagnostics)
    pub fn message_only(message: impl Into<String>) -> Self {
        Self::new(None, None, message)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Connection error: {0}")]
    Connection(StoreError),

    #[error("Schema error: {0}")]
    Schema(StoreError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(StoreError),

    #[error("Query error: {0}")]
    Query(StoreError),

    #[error("{original} (rollback also failed: {rollback})")]
    RollbackFailed {
        original: Box<AppError>,
        rollback: Box<AppError>,
    },
}

impl AppError {
    /// Store diagnostics carried by this error, if it came from the store
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            AppError::Connection(e)
            | AppError::Schema(e)
            | AppError::ConstraintViolation(e)
            | AppError::Query(e) => Some(e),
            AppError::Domain(_) | AppError::RollbackFailed { .. } => None,
        }
    }

    /// The error that started the failure, looking through a failed rollback
    pub fn root_cause(&self) -> &AppError {
        match self {
            AppError::RollbackFailed { original, .. } => original.root_cause(),
            other => other,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self.root_cause(), AppError::ConstraintViolation(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn duplicate() -> AppError {
        AppError::ConstraintViolation(StoreError::new(
            Some("1062".to_string()),
            Some("23000".to_string()),
            "Duplicate entry 'alice' for key 'uq_users_name'",
        ))
    }

    #[test]
    fn test_root_cause_looks_through_rollback_failure() {
        let err = AppError::RollbackFailed {
            original: Box::new(duplicate()),
            rollback: Box::new(AppError::Connection(StoreError::message_only("gone"))),
        };

        assert!(err.is_constraint_violation());
        assert!(err.store_error().is_none());
        assert_eq!(
            err.root_cause().store_error().and_then(|e| e.code.as_deref()),
            Some("1062")
        );
    }

    #[test]
    fn test_display_keeps_both_errors() {
        let err = AppError::RollbackFailed {
            original: Box::new(duplicate()),
            rollback: Box::new(AppError::Connection(StoreError::message_only("gone"))),
        };

        let text = err.to_string();
        assert!(text.contains("Duplicate entry"));
        assert!(text.contains("rollback also failed"));
        assert!(text.contains("gone"));
    }
}
