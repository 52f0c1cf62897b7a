// Domain Layer - Pure data model and validation

pub mod config;
pub mod error;
pub mod transaction;
pub mod user;

// Re-exports
pub use config::{validate_schema_name, ConnectionConfig, Endpoint, DEFAULT_MYSQL_PORT};
pub use error::DomainError;
pub use transaction::TransactionState;
pub use user::{NewUser, User, UserId, MAX_NAME_LEN};
