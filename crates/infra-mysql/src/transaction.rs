// MySQL Transaction Control
// Drives the server's `autocommit` session variable directly.

use crate::connection::MySqlSession;
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use tracing::debug;
use usersdb_core::error::Result;
use usersdb_core::port::TransactionControl;

impl MySqlSession {
    async fn execute_control(&mut self, statement: &str) -> Result<()> {
        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(statement))
            .await
            .map_err(map_sqlx_error)?;
        debug!(statement, "Transaction control");
        Ok(())
    }
}

#[async_trait]
impl TransactionControl for MySqlSession {
    fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    async fn set_autocommit(&mut self, enabled: bool) -> Result<()> {
        if self.autocommit == enabled {
            return Ok(());
        }
        // Setting autocommit = 1 commits any open transaction server-side
        let statement = if enabled {
            "SET autocommit = 1"
        } else {
            "SET autocommit = 0"
        };
        self.execute_control(statement).await?;
        self.autocommit = enabled;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.execute_control("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.execute_control("ROLLBACK").await
    }
}
