// Port Layer - Interfaces implemented by store adapters

pub mod connection;
pub mod mocks;
pub mod schema;
pub mod transaction;
pub mod user_repository;

// Re-exports
pub use connection::{ConnectionProvider, Session};
pub use schema::SchemaInitializer;
pub use transaction::TransactionControl;
pub use user_repository::UserRepository;
