// SQLite Transaction Control
// SQLite has no autocommit switch; "autocommit off" is an open BEGIN that is
// re-opened after every COMMIT/ROLLBACK, matching server semantics.

use crate::connection::SqliteSession;
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use tracing::debug;
use usersdb_core::error::Result;
use usersdb_core::port::TransactionControl;

impl SqliteSession {
    async fn execute_control(&mut self, statement: &str) -> Result<()> {
        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(statement))
            .await
            .map_err(map_sqlx_error)?;
        debug!(statement, "Transaction control");
        Ok(())
    }
}

#[async_trait]
impl TransactionControl for SqliteSession {
    fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    async fn set_autocommit(&mut self, enabled: bool) -> Result<()> {
        match (self.autocommit, enabled) {
            (true, false) => self.execute_control("BEGIN").await?,
            // Re-enabling autocommit commits pending work
            (false, true) => self.execute_control("COMMIT").await?,
            _ => {}
        }
        self.autocommit = enabled;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.autocommit {
            return Ok(());
        }
        self.execute_control("COMMIT").await?;
        self.execute_control("BEGIN").await
    }

    async fn rollback(&mut self) -> Result<()> {
        if self.autocommit {
            return Ok(());
        }
        self.execute_control("ROLLBACK").await?;
        self.execute_control("BEGIN").await
    }
}
