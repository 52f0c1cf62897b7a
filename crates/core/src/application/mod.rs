// Application Layer - Use Cases

pub mod transaction;
pub mod walkthrough;

// Re-exports
pub use transaction::run_in_transaction;
pub use walkthrough::{WalkthroughOptions, WalkthroughProgress, WalkthroughReport};
