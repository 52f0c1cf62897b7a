// Transaction State Machine

use super::error::{DomainError, Result};
use serde::Serialize;

/// Lifecycle of a unit of work on one session
///
/// ```text
/// Autocommit -> InTransaction -> Committed  -> Autocommit
///                             -> RolledBack -> Autocommit
///                             -> Autocommit   (rollback failed, autocommit forced back)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    Autocommit,
    InTransaction,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn can_transition_to(self, next: TransactionState) -> bool {
        use TransactionState::*;
        matches!(
            (self, next),
            (Autocommit, InTransaction)
                | (InTransaction, Committed)
                | (InTransaction, RolledBack)
                | (InTransaction, Autocommit)
                | (Committed, Autocommit)
                | (RolledBack, Autocommit)
        )
    }

    /// Move to `next`, rejecting edges outside the lifecycle
    pub fn transition(&mut self, next: TransactionState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::Autocommit => write!(f, "AUTOCOMMIT"),
            TransactionState::InTransaction => write!(f, "IN_TRANSACTION"),
            TransactionState::Committed => write!(f, "COMMITTED"),
            TransactionState::RolledBack => write!(f, "ROLLED_BACK"),
        }
    }
}
