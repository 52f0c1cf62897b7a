// Transaction control port

use crate::error::Result;
use async_trait::async_trait;

/// Autocommit and commit/rollback control of one session
///
/// Follows server autocommit semantics: while autocommit is disabled every
/// statement belongs to the current transaction, `commit`/`rollback` end it and
/// the next statement starts a new one. Re-enabling autocommit commits any
/// pending work.
#[async_trait]
pub trait TransactionControl: Send {
    fn is_autocommit(&self) -> bool;

    async fn set_autocommit(&mut self, enabled: bool) -> Result<()>;

    async fn commit(&mut self) -> Result<()>;

    async fn rollback(&mut self) -> Result<()>;
}
