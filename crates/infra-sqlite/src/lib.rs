// usersdb Infrastructure - SQLite Adapter
// Implements: ConnectionProvider, Session, SchemaInitializer, UserRepository, TransactionControl

mod connection;
mod error;
mod schema;
mod transaction;
mod user_repository;

pub use connection::{SqliteConnectionProvider, SqliteSession};

// Note: sqlx::Error conversion is handled by helper functions in `error`
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
