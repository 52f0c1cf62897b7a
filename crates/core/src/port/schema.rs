// Schema Initializer Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SchemaInitializer: Send {
    /// Ensure `schema` and its `users` table exist, and make `schema` active
    ///
    /// Idempotent: repeated calls leave the schema unchanged and succeed.
    ///
    /// # Errors
    /// - `AppError::Domain` if `schema` is not a valid identifier
    /// - `AppError::Schema` on any DDL failure (no partial recovery)
    async fn ensure_schema(&mut self, schema: &str) -> Result<()>;
}
