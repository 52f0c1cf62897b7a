// SQLite UserRepository Implementation

use crate::connection::SqliteSession;
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::debug;
use usersdb_core::domain::{NewUser, User, UserId};
use usersdb_core::error::{AppError, Result, StoreError};
use usersdb_core::port::UserRepository;

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    age: Option<i32>,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let age = self
            .age
            .map(|age| {
                u32::try_from(age).map_err(|_| {
                    AppError::Query(StoreError::message_only(format!(
                        "negative age {} stored for user {}",
                        age, self.id
                    )))
                })
            })
            .transpose()?;

        Ok(User {
            id: self.id,
            name: self.name,
            age,
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>> {
    rows.into_iter().map(UserRow::into_user).collect()
}

/// Shared by insert_one and insert_many; the statement text is identical so
/// the connection's statement cache prepares it once.
async fn insert_row(conn: &mut SqliteConnection, table: &str, user: &NewUser) -> Result<UserId> {
    let age = user.validate()?;

    let sql = format!("INSERT INTO {} (name, age) VALUES (?, ?)", table);
    let result = sqlx::query(&sql)
        .bind(&user.name)
        .bind(age)
        .execute(conn)
        .await
        .map_err(map_sqlx_error)?;

    let id = result.last_insert_rowid();
    debug!(id, name = %user.name, "Inserted user");
    Ok(id)
}

#[async_trait]
impl UserRepository for SqliteSession {
    async fn insert_one(&mut self, user: &NewUser) -> Result<UserId> {
        insert_row(&mut self.conn, &self.table, user).await
    }

    async fn insert_many(&mut self, users: &[NewUser]) -> Result<Vec<UserId>> {
        let mut ids = Vec::with_capacity(users.len());
        for user in users {
            ids.push(insert_row(&mut self.conn, &self.table, user).await?);
        }
        Ok(ids)
    }

    async fn update_age_by_name(&mut self, name: &str, age: u32) -> Result<u64> {
        let age = usersdb_core::domain::user::age_to_column(age)?;

        let sql = format!("UPDATE {} SET age = ? WHERE name = ?", self.table);
        let result = sqlx::query(&sql)
            .bind(age)
            .bind(name)
            .execute(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        debug!(name, age, rows = result.rows_affected(), "Updated age");
        Ok(result.rows_affected())
    }

    async fn select_by_min_age(&mut self, min_age: u32) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT id, name, age FROM {} WHERE age >= ? ORDER BY age DESC, id ASC",
            self.table
        );
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(i64::from(min_age))
            .fetch_all(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        into_users(rows)
    }

    async fn find_by_name(&mut self, name: &str) -> Result<Option<User>> {
        let sql = format!("SELECT id, name, age FROM {} WHERE name = ?", self.table);
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list_all(&mut self) -> Result<Vec<User>> {
        let sql = format!("SELECT id, name, age FROM {} ORDER BY id", self.table);
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .fetch_all(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        into_users(rows)
    }

    async fn count(&mut self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn delete_all(&mut self) -> Result<u64> {
        let sql = format!("DELETE FROM {}", self.table);
        let result = sqlx::query(&sql)
            .execute(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
