// SQLite Connection Provider

use crate::error::connection_error;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::Connection;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use usersdb_core::domain::ConnectionConfig;
use usersdb_core::error::Result;
use usersdb_core::port::{ConnectionProvider, Session};

/// Opens single-connection SQLite sessions
///
/// `ConnectionConfig::host` is the database location (`:memory:`, a file path
/// or a `sqlite:` URL); credentials are ignored.
#[derive(Debug, Clone, Default)]
pub struct SqliteConnectionProvider;

impl SqliteConnectionProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConnectionProvider for SqliteConnectionProvider {
    type Session = SqliteSession;

    async fn connect(&self, config: &ConnectionConfig) -> Result<SqliteSession> {
        let location = config.host();
        info!(location, "Opening SQLite database");

        let options = SqliteConnectOptions::from_str(location)
            .map_err(connection_error)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true)
            .foreign_keys(true);

        let conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(connection_error)?;

        Ok(SqliteSession::new(conn, schema_dir(location)))
    }
}

/// One open SQLite connection plus the session state the ports need
pub struct SqliteSession {
    pub(crate) conn: SqliteConnection,
    pub(crate) autocommit: bool,
    /// Where attached schema files live; `None` attaches in-memory databases
    pub(crate) schema_dir: Option<PathBuf>,
    /// Users table of the active schema
    pub(crate) table: String,
}

impl SqliteSession {
    pub(crate) fn new(conn: SqliteConnection, schema_dir: Option<PathBuf>) -> Self {
        Self {
            conn,
            autocommit: true,
            schema_dir,
            table: "users".to_string(),
        }
    }

    /// Qualified name of the users table queries run against
    pub fn users_table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl Session for SqliteSession {
    async fn close(self) -> Result<()> {
        if !self.autocommit {
            warn!("Closing session with an open transaction; pending work is discarded");
        }
        self.conn.close().await.map_err(connection_error)?;
        info!("SQLite session closed");
        Ok(())
    }
}

/// Directory for attached schema files, next to the main database file
fn schema_dir(location: &str) -> Option<PathBuf> {
    let path = location
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split_once('?').map_or(path, |(p, _)| p);

    if path.is_empty() || path == ":memory:" || location.contains("mode=memory") {
        return None;
    }

    let dir = Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use usersdb_core::port::TransactionControl;
    use usersdb_core::AppError;

    fn config(location: &str) -> ConnectionConfig {
        ConnectionConfig::new(location, "", "", "testdb")
    }

    #[tokio::test]
    async fn test_connect_in_memory() {
        let session = SqliteConnectionProvider::new()
            .connect(&config(":memory:"))
            .await
            .unwrap();

        assert!(session.is_autocommit());
        assert_eq!(session.users_table(), "users");
        assert!(session.schema_dir.is_none());
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_unreachable_path_is_connection_error() {
        let result = SqliteConnectionProvider::new()
            .connect(&config("/nonexistent-usersdb-dir/nested/users.db"))
            .await;

        assert!(matches!(result, Err(AppError::Connection(_))));
    }

    #[test]
    fn test_schema_dir() {
        assert_eq!(schema_dir(":memory:"), None);
        assert_eq!(schema_dir("sqlite::memory:"), None);
        assert_eq!(schema_dir("sqlite://app.db?mode=memory"), None);
        assert_eq!(schema_dir("/var/lib/usersdb/main.db"), Some(PathBuf::from("/var/lib/usersdb")));
        assert_eq!(schema_dir("sqlite:///tmp/main.db?mode=rwc"), Some(PathBuf::from("/tmp")));
        assert_eq!(schema_dir("main.db"), Some(PathBuf::from(".")));
    }
}
