// Connection Configuration

use super::error::{DomainError, Result};
use std::fmt;

/// Port used when the endpoint does not name one
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

const TCP_SCHEME: &str = "tcp://";
const MAX_SCHEMA_NAME_LEN: usize = 64;

/// Where and as whom to connect. Immutable once built.
///
/// `host` is a `tcp://HOST:PORT` endpoint for network stores, or a location
/// (`:memory:`, file path) for embedded ones.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    username: String,
    password: String,
    schema: String,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            schema: schema.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Parse `host` as a TCP endpoint
    ///
    /// Accepts `tcp://HOST:PORT`, `HOST:PORT`, `HOST` and bracketed IPv6
    /// (`[::1]:3306`). The port defaults to 3306.
    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::parse(&self.host)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("schema", &self.schema)
            .finish()
    }
}

/// A parsed `host:port` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| DomainError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: reason.to_string(),
        };

        let rest = match raw.strip_prefix(TCP_SCHEME) {
            Some(rest) => rest,
            None if raw.contains("://") => return Err(invalid("only tcp:// is supported")),
            None => raw,
        };

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            let (host, tail) = bracketed
                .split_once(']')
                .ok_or_else(|| invalid("unterminated IPv6 address"))?;
            let port = match tail {
                "" => None,
                _ => Some(
                    tail.strip_prefix(':')
                        .ok_or_else(|| invalid("expected ':' after IPv6 address"))?,
                ),
            };
            (host, port)
        } else {
            match rest.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (rest, None),
            }
        };

        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        let port = match port {
            Some(p) => p.parse::<u16>().map_err(|_| invalid("port is not a number in 0-65535"))?,
            None => DEFAULT_MYSQL_PORT,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

/// Validate a schema (database) name before it is quoted into DDL
///
/// Identifiers cannot be bound as parameters, so only ASCII alphanumerics and
/// `_` are accepted.
pub fn validate_schema_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| DomainError::InvalidSchemaName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("cannot be empty"));
    }

    if name.len() > MAX_SCHEMA_NAME_LEN {
        return Err(invalid("too long (max 64 chars)"));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("must be alphanumeric or underscore"));
    }

    Ok(())
}
