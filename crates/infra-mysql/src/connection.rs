// MySQL Connection Provider

use crate::error::connection_error;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use tracing::{info, warn};
use usersdb_core::domain::ConnectionConfig;
use usersdb_core::error::Result;
use usersdb_core::port::{ConnectionProvider, Session};

/// Opens one MySQL connection per session, no pooling
#[derive(Debug, Clone, Default)]
pub struct MySqlConnectionProvider;

impl MySqlConnectionProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConnectionProvider for MySqlConnectionProvider {
    type Session = MySqlSession;

    async fn connect(&self, config: &ConnectionConfig) -> Result<MySqlSession> {
        let endpoint = config.endpoint()?;
        info!(
            host = %endpoint.host,
            port = endpoint.port,
            user = config.username(),
            "Connecting to MySQL"
        );

        let mut options = MySqlConnectOptions::new()
            .host(&endpoint.host)
            .port(endpoint.port)
            .username(config.username())
            .charset("utf8mb4");
        if !config.password().is_empty() {
            options = options.password(config.password());
        }

        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(connection_error)?;

        info!(host = %endpoint.host, port = endpoint.port, "Connected");
        Ok(MySqlSession::new(conn))
    }
}

/// One open MySQL connection plus the session state the ports need
pub struct MySqlSession {
    pub(crate) conn: MySqlConnection,
    /// Mirrors the server-side `autocommit` session variable
    pub(crate) autocommit: bool,
    /// Database selected by the last `ensure_schema`
    pub(crate) schema: Option<String>,
}

impl MySqlSession {
    pub(crate) fn new(conn: MySqlConnection) -> Self {
        Self {
            conn,
            autocommit: true,
            schema: None,
        }
    }

    /// Database the session is using, if one was selected
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }
}

#[async_trait]
impl Session for MySqlSession {
    async fn close(self) -> Result<()> {
        if !self.autocommit {
            warn!("Closing session with an open transaction; the server rolls it back");
        }
        self.conn.close().await.map_err(connection_error)?;
        info!("MySQL session closed");
        Ok(())
    }
}
