// Connection Provider Port (Interface)

use crate::domain::ConnectionConfig;
use crate::error::Result;
use crate::port::{SchemaInitializer, TransactionControl, UserRepository};
use async_trait::async_trait;

/// An open session with the store, owned exclusively by the caller
///
/// Every operation takes `&mut self`: a session serves one unit of work at a
/// time. Dropping a session releases the underlying connection.
#[async_trait]
pub trait Session: SchemaInitializer + UserRepository + TransactionControl + Send {
    /// Close the session gracefully
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Opens sessions against a store
///
/// Constructed once by the entry point and passed to whoever needs sessions.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Session: Session;

    /// Open one session
    ///
    /// # Errors
    /// - `AppError::Connection` on network or authentication failure
    /// - `AppError::Domain` if the configured endpoint is malformed
    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Session>;
}
