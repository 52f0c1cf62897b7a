// sqlx::Error -> AppError classification

use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::mysql::MySqlDatabaseError;
use usersdb_core::{AppError, StoreError};

// MySQL server error numbers that mean the session itself is unusable
// https://dev.mysql.com/doc/mysql-errors/8.0/en/
const ER_DBACCESS_DENIED_ERROR: u16 = 1044;
const ER_ACCESS_DENIED_ERROR: u16 = 1045;
const CR_SERVER_GONE_ERROR: u16 = 2006;
const CR_SERVER_LOST: u16 = 2013;
const ER_CON_COUNT_ERROR: u16 = 1040;

fn database_diagnostic(db_err: &dyn DatabaseError) -> StoreError {
    let number = db_err
        .try_downcast_ref::<MySqlDatabaseError>()
        .map(|e| e.number().to_string());

    // For MySQL, DatabaseError::code() is the SQLSTATE
    StoreError::new(number, db_err.code().map(|c| c.into_owned()), db_err.message())
}

/// Diagnostics of any sqlx error
pub(crate) fn diagnostic(err: &sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => database_diagnostic(db_err.as_ref()),
        other => StoreError::message_only(other.to_string()),
    }
}

/// Classify a failed statement
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let store = database_diagnostic(db_err.as_ref());
            match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => AppError::ConstraintViolation(store),
                _ => {
                    let number = db_err
                        .try_downcast_ref::<MySqlDatabaseError>()
                        .map(MySqlDatabaseError::number);
                    match number {
                        Some(
                            ER_DBACCESS_DENIED_ERROR
                            | ER_ACCESS_DENIED_ERROR
                            | CR_SERVER_GONE_ERROR
                            | CR_SERVER_LOST
                            | ER_CON_COUNT_ERROR,
                        ) => AppError::Connection(store),
                        _ => AppError::Query(store),
                    }
                }
            }
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => AppError::Connection(diagnostic(&err)),
        _ => AppError::Query(diagnostic(&err)),
    }
}

/// Any failure during DDL
pub(crate) fn schema_error(err: sqlx::Error) -> AppError {
    AppError::Schema(diagnostic(&err))
}

/// Any failure while opening or closing the session
pub(crate) fn connection_error(err: sqlx::Error) -> AppError {
    AppError::Connection(diagnostic(&err))
}
