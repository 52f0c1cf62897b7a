// usersdb Core - Domain Logic & Ports
// NO database driver dependencies (adapters live in infra-* crates)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result, StoreError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
