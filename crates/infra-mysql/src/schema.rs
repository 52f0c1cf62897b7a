// Schema Initializer
// CREATE DATABASE + USE + CREATE TABLE, all idempotent

use crate::connection::MySqlSession;
use crate::error::schema_error;
use async_trait::async_trait;
use tracing::info;
use usersdb_core::domain::validate_schema_name;
use usersdb_core::error::Result;
use usersdb_core::port::SchemaInitializer;

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT NOT NULL AUTO_INCREMENT,
        name VARCHAR(100) NOT NULL,
        age INT NULL,
        PRIMARY KEY (id),
        UNIQUE KEY uq_users_name (name)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

#[async_trait]
impl SchemaInitializer for MySqlSession {
    async fn ensure_schema(&mut self, schema: &str) -> Result<()> {
        validate_schema_name(schema)?;
        info!(schema, "Ensuring schema and users table");

        // USE is not supported by the prepared statement protocol, so these
        // go through the text protocol
        let create = format!("CREATE DATABASE IF NOT EXISTS `{}`", schema);
        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(&create))
            .await
            .map_err(schema_error)?;

        let use_schema = format!("USE `{}`", schema);
        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(&use_schema))
            .await
            .map_err(schema_error)?;
        self.schema = Some(schema.to_string());

        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(CREATE_USERS_TABLE))
            .await
            .map_err(schema_error)?;

        info!(schema, "Schema ready");
        Ok(())
    }
}
