// ============================================================================
// Mock Implementations for Testing
// ============================================================================

use super::*;
use crate::domain::{NewUser, User, UserId};
use crate::error::{AppError, Result, StoreError};
use async_trait::async_trait;

/// Operations a `MockSession` can be told to fail
#[derive(Debug, Clone, Copy, Default)]
pub struct MockFailures {
    pub commit: bool,
    pub rollback: bool,
    /// Fail when autocommit is switched back on
    pub enable_autocommit: bool,
    /// Fail `select_by_min_age`
    pub select: bool,
}

/// In-memory session following server autocommit semantics
///
/// Records every transaction-control call in `calls` so tests can assert
/// ordering.
#[derive(Debug)]
pub struct MockSession {
    rows: Vec<User>,
    next_id: UserId,
    autocommit: bool,
    /// Table state at the start of the open transaction
    snapshot: Option<Vec<User>>,
    pub failures: MockFailures,
    pub calls: Vec<&'static str>,
    pub schema: Option<String>,
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
            autocommit: true,
            snapshot: None,
            failures: MockFailures::default(),
            calls: Vec::new(),
            schema: None,
        }
    }

    pub fn with_failures(failures: MockFailures) -> Self {
        Self {
            failures,
            ..Self::new()
        }
    }

    pub fn rows(&self) -> &[User] {
        &self.rows
    }

    fn injected(operation: &str) -> AppError {
        AppError::Connection(StoreError::new(
            Some("2013".to_string()),
            Some("HY000".to_string()),
            format!("Lost connection to MySQL server during {}", operation),
        ))
    }

    fn begin(&mut self) {
        self.snapshot = Some(self.rows.clone());
    }
}

#[async_trait]
impl SchemaInitializer for MockSession {
    async fn ensure_schema(&mut self, schema: &str) -> Result<()> {
        crate::domain::validate_schema_name(schema)?;
        self.schema = Some(schema.to_string());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockSession {
    async fn insert_one(&mut self, user: &NewUser) -> Result<UserId> {
        user.validate()?;

        if self.rows.iter().any(|u| u.name == user.name) {
            return Err(AppError::ConstraintViolation(StoreError::new(
                Some("1062".to_string()),
                Some("23000".to_string()),
                format!("Duplicate entry '{}' for key 'uq_users_name'", user.name),
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(User {
            id,
            name: user.name.clone(),
            age: user.age,
        });
        Ok(id)
    }

    async fn insert_many(&mut self, users: &[NewUser]) -> Result<Vec<UserId>> {
        let mut ids = Vec::with_capacity(users.len());
        for user in users {
            ids.push(self.insert_one(user).await?);
        }
        Ok(ids)
    }

    async fn update_age_by_name(&mut self, name: &str, age: u32) -> Result<u64> {
        let mut affected = 0;
        for user in self.rows.iter_mut().filter(|u| u.name == name) {
            user.age = Some(age);
            affected += 1;
        }
        Ok(affected)
    }

    async fn select_by_min_age(&mut self, min_age: u32) -> Result<Vec<User>> {
        if self.failures.select {
            return Err(Self::injected("SELECT"));
        }
        let mut matching: Vec<User> = self
            .rows
            .iter()
            .filter(|u| u.age.is_some_and(|age| age >= min_age))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.age.cmp(&a.age).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn find_by_name(&mut self, name: &str) -> Result<Option<User>> {
        Ok(self.rows.iter().find(|u| u.name == name).cloned())
    }

    async fn list_all(&mut self) -> Result<Vec<User>> {
        let mut all = self.rows.clone();
        all.sort_by_key(|u| u.id);
        Ok(all)
    }

    async fn count(&mut self) -> Result<i64> {
        Ok(self.rows.len() as i64)
    }

    async fn delete_all(&mut self) -> Result<u64> {
        let deleted = self.rows.len() as u64;
        self.rows.clear();
        Ok(deleted)
    }
}

#[async_trait]
impl TransactionControl for MockSession {
    fn is_autocommit(&self) -> bool {
        self.autocommit
    }

    async fn set_autocommit(&mut self, enabled: bool) -> Result<()> {
        self.calls.push(if enabled {
            "autocommit_on"
        } else {
            "autocommit_off"
        });

        if enabled && self.failures.enable_autocommit {
            return Err(Self::injected("SET autocommit"));
        }

        if enabled {
            // Pending work is committed when autocommit comes back
            self.snapshot = None;
        } else if self.autocommit {
            self.begin();
        }
        self.autocommit = enabled;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.calls.push("commit");
        if self.failures.commit {
            return Err(Self::injected("COMMIT"));
        }
        if !self.autocommit {
            self.begin();
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.calls.push("rollback");
        if self.failures.rollback {
            return Err(Self::injected("ROLLBACK"));
        }
        // next_id is left alone: auto-increment values are not reused
        if let Some(rows) = self.snapshot.take() {
            self.rows = rows;
        }
        if !self.autocommit {
            self.begin();
        }
        Ok(())
    }
}

#[async_trait]
impl Session for MockSession {
    async fn close(self) -> Result<()> {
        Ok(())
    }
}
