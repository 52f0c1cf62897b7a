// Schema Initializer
// A schema is an attached database; the users table lives inside it.

use crate::connection::SqliteSession;
use crate::error::schema_error;
use async_trait::async_trait;
use tracing::{debug, info};
use usersdb_core::domain::validate_schema_name;
use usersdb_core::error::{AppError, Result, StoreError};
use usersdb_core::port::SchemaInitializer;

fn create_users_table(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NULL,
            CONSTRAINT uq_users_name UNIQUE (name)
        )
        "#
    )
}

#[async_trait]
impl SchemaInitializer for SqliteSession {
    async fn ensure_schema(&mut self, schema: &str) -> Result<()> {
        validate_schema_name(schema)?;

        // DDL here would join the open transaction and vanish on rollback
        if !self.autocommit {
            return Err(AppError::Schema(StoreError::message_only(format!(
                "cannot prepare schema {} inside an open transaction",
                schema
            ))));
        }

        info!(schema, "Ensuring schema and users table");

        let attached: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_database_list")
            .fetch_all(&mut self.conn)
            .await
            .map_err(schema_error)?;

        if !attached.iter().any(|name| name == schema) {
            let file = match &self.schema_dir {
                Some(dir) => dir
                    .join(format!("{}.db", schema))
                    .to_string_lossy()
                    .into_owned(),
                None => ":memory:".to_string(),
            };
            debug!(schema, file = %file, "Attaching database");

            let attach = format!("ATTACH DATABASE ? AS \"{}\"", schema);
            sqlx::query(&attach)
                .bind(&file)
                .execute(&mut self.conn)
                .await
                .map_err(schema_error)?;
        }

        let table = format!("\"{}\".users", schema);
        let ddl = create_users_table(&table);
        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(&ddl))
            .await
            .map_err(schema_error)?;

        self.table = table;
        info!(schema, "Schema ready");
        Ok(())
    }
}
