// User Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier (auto-increment primary key)
pub type UserId = i64;

/// Width of the `name` column, in characters
pub const MAX_NAME_LEN: usize = 100;

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// `None` when the stored age is NULL
    pub age: Option<u32>,
}

/// Insert payload; the id is assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: Option<u32>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, age: Option<u32>) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }

    pub fn with_age(name: impl Into<String>, age: u32) -> Self {
        Self::new(name, Some(age))
    }

    pub fn without_age(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Validate the payload and return the age in column representation
    ///
    /// # Errors
    /// - `DomainError::InvalidName` if the name is blank or wider than the column
    /// - `DomainError::AgeOutOfRange` if the age does not fit a signed 32-bit column
    pub fn validate(&self) -> Result<Option<i32>> {
        validate_name(&self.name)?;
        self.age.map(age_to_column).transpose()
    }
}

/// Check a user name against the column constraints
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName("name cannot be empty".to_string()));
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(DomainError::InvalidName(format!(
            "name too long ({} chars, max {})",
            len, MAX_NAME_LEN
        )));
    }

    Ok(())
}

/// Convert an age to the signed column type
pub fn age_to_column(age: u32) -> Result<i32> {
    i32::try_from(age).map_err(|_| DomainError::AgeOutOfRange(age))
}
