// usersdb Infrastructure - MySQL Adapter
// Implements: ConnectionProvider, Session, SchemaInitializer, UserRepository, TransactionControl

mod connection;
mod error;
mod schema;
mod transaction;
mod user_repository;

pub use connection::{MySqlConnectionProvider, MySqlSession};
