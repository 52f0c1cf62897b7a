// User Repository Port (Interface)

use crate::domain::{NewUser, User, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// Record operations on the `users` table of the active schema
///
/// Values are always bound as statement parameters.
#[async_trait]
pub trait UserRepository: Send {
    /// Insert one user and return the store-assigned id
    ///
    /// # Errors
    /// - `AppError::ConstraintViolation` if the name already exists
    async fn insert_one(&mut self, user: &NewUser) -> Result<UserId>;

    /// Insert users in order with one prepared statement
    ///
    /// Fail-fast: the first failure stops the sequence and is returned.
    /// Rows inserted earlier in the call are not undone here; inside a
    /// transaction the enclosing coordinator decides their fate.
    async fn insert_many(&mut self, users: &[NewUser]) -> Result<Vec<UserId>>;

    /// Set the age of the user named `name`; returns rows affected (0 if absent)
    async fn update_age_by_name(&mut self, name: &str, age: u32) -> Result<u64>;

    /// Users with `age >= min_age`, by age descending then id ascending
    ///
    /// Users without an age never match.
    async fn select_by_min_age(&mut self, min_age: u32) -> Result<Vec<User>>;

    /// Find user by name
    async fn find_by_name(&mut self, name: &str) -> Result<Option<User>>;

    /// All users ordered by id
    async fn list_all(&mut self) -> Result<Vec<User>>;

    /// Number of rows in the table
    async fn count(&mut self) -> Result<i64>;

    /// Delete every row; returns rows deleted
    async fn delete_all(&mut self) -> Result<u64>;
}
