// Runtime configuration
// Built-in defaults, each overridable by one USERSDB_* environment variable.

use anyhow::{bail, Result};
use usersdb_core::domain::ConnectionConfig;

pub const DEFAULT_HOST: &str = "tcp://127.0.0.1:3306";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PASSWORD: &str = "";
pub const DEFAULT_SCHEMA: &str = "testdb";
pub const DEFAULT_SQLITE_PATH: &str = ":memory:";

/// Which adapter serves the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    MySql,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreKind,
    pub connection: ConnectionConfig,
    pub output: OutputFormat,
    pub simulate_conflict: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and empty values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let store = match get("USERSDB_STORE").as_deref() {
            None | Some("mysql") => StoreKind::MySql,
            Some("sqlite") => StoreKind::Sqlite,
            Some(other) => bail!("USERSDB_STORE must be 'mysql' or 'sqlite', got '{}'", other),
        };

        let output = match get("USERSDB_OUTPUT").as_deref() {
            None | Some("text") => OutputFormat::Text,
            Some("json") => OutputFormat::Json,
            Some(other) => bail!("USERSDB_OUTPUT must be 'text' or 'json', got '{}'", other),
        };

        let simulate_conflict = match get("USERSDB_SIMULATE_CONFLICT").as_deref() {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => bail!(
                "USERSDB_SIMULATE_CONFLICT must be 1/true or 0/false, got '{}'",
                other
            ),
        };

        let schema = get("USERSDB_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

        // The password may legitimately be empty, so it skips the empty filter
        let password = lookup("USERSDB_PASSWORD").unwrap_or_else(|| DEFAULT_PASSWORD.to_string());

        let connection = match store {
            StoreKind::MySql => ConnectionConfig::new(
                get("USERSDB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                get("USERSDB_USER").unwrap_or_else(|| DEFAULT_USER.to_string()),
                password,
                schema,
            ),
            StoreKind::Sqlite => {
                let path = get("USERSDB_SQLITE_PATH")
                    .map(|p| shellexpand::tilde(&p).into_owned())
                    .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string());
                ConnectionConfig::new(path, "", "", schema)
            }
        };

        Ok(Self {
            store,
            connection,
            output,
            simulate_conflict,
        })
    }
}
