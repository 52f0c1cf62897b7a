// MySQL UserRepository Implementation

use crate::connection::MySqlSession;
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::MySqlConnection;
use tracing::debug;
use usersdb_core::domain::user::age_to_column;
use usersdb_core::domain::{NewUser, User, UserId};
use usersdb_core::error::{AppError, Result, StoreError};
use usersdb_core::port::UserRepository;

const INSERT_USER: &str = "INSERT INTO users (name, age) VALUES (?, ?)";
const UPDATE_AGE: &str = "UPDATE users SET age = ? WHERE name = ?";
const SELECT_BY_MIN_AGE: &str =
    "SELECT id, name, age FROM users WHERE age >= ? ORDER BY age DESC, id ASC";
const SELECT_BY_NAME: &str = "SELECT id, name, age FROM users WHERE name = ?";
const SELECT_ALL: &str = "SELECT id, name, age FROM users ORDER BY id";
const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";
const DELETE_ALL: &str = "DELETE FROM users";

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

async fn insert_row(conn: &mut MySqlConnection, user: &NewUser) -> Result<UserId> {
    let age = user.validate()?;

    let result = sqlx::query(INSERT_USER)
        .bind(&user.name)
        .bind(age)
        .execute(conn)
        .await
        .map_err(map_sqlx_error)?;

    let id = UserId::try_from(result.last_insert_id()).map_err(|_| {
        AppError::Query(StoreError::message_only(format!(
            "generated id {} does not fit a signed 64-bit key",
            result.last_insert_id()
        )))
    })?;
    debug!(id, name = %user.name, "Inserted user");
    Ok(id)
}

#[async_trait]
impl UserRepository for MySqlSession {
    async fn insert_one(&mut self, user: &NewUser) -> Result<UserId> {
        insert_row(&mut self.conn, user).await
    }

    async fn insert_many(&mut self, users: &[NewUser]) -> Result<Vec<UserId>> {
        let mut ids = Vec::with_capacity(users.len());
        for user in users {
            ids.push(insert_row(&mut self.conn, user).await?);
        }
        Ok(ids)
    }

    async fn update_age_by_name(&mut self, name: &str, age: u32) -> Result<u64> {
        let age = age_to_column(age)?;

        // sqlx negotiates CLIENT_FOUND_ROWS: this counts matched rows, so
        // writing an unchanged age still reports 1
        let result = sqlx::query(UPDATE_AGE)
            .bind(age)
            .bind(name)
            .execute(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        debug!(name, age, rows = result.rows_affected(), "Updated age");
        Ok(result.rows_affected())
    }

    async fn select_by_min_age(&mut self, min_age: u32) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(SELECT_BY_MIN_AGE)
            .bind(i64::from(min_age))
            .fetch_all(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn find_by_name(&mut self, name: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(SELECT_BY_NAME)
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list_all(&mut self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn count(&mut self) -> Result<i64> {
        sqlx::query_scalar(COUNT_USERS)
            .fetch_one(&mut self.conn)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_all(&mut self) -> Result<u64> {
        let result = sqlx::query(DELETE_ALL)
            .execute(&mut self.conn)
            .await
            .map_err(map_sqlx_error)?;

        debug!(rows = result.rows_affected(), "Deleted all users");
        Ok(result.rows_affected())
    }
}
