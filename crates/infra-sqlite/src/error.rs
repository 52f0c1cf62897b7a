// sqlx::Error -> AppError classification

use sqlx::error::{DatabaseError, ErrorKind};
use usersdb_core::{AppError, StoreError};

// SQLite result codes: https://www.sqlite.org/rescode.html
const SQLITE_CANTOPEN: &str = "14";
const SQLITE_NOTADB: &str = "26";
const SQLITE_IOERR: &str = "10";

fn database_diagnostic(db_err: &dyn DatabaseError) -> StoreError {
    // SQLite reports extended result codes and no SQLSTATE
    StoreError::new(
        db_err.code().map(|c| c.into_owned()),
        None,
        db_err.message(),
    )
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
                    let primary = store.code.as_deref().map(primary_code);
                    match primary {
                        Some(SQLITE_CANTOPEN) | Some(SQLITE_NOTADB) | Some(SQLITE_IOERR) => {
                            AppError::Connection(store)
                        }
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

/// Primary result code of an extended code (low byte)
fn primary_code(extended: &str) -> &'static str {
    match extended.parse::<i32>().map(|c| c & 0xff) {
        Ok(14) => SQLITE_CANTOPEN,
        Ok(26) => SQLITE_NOTADB,
        Ok(10) => SQLITE_IOERR,
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_connection_errors() {
        let err = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "broken pipe",
        ));
        assert!(matches!(map_sqlx_error(err), AppError::Connection(_)));
    }

    #[test]
    fn test_client_errors_are_query_errors() {
        let err = sqlx::Error::ColumnNotFound("age".to_string());
        match map_sqlx_error(err) {
            AppError::Query(store) => {
                assert!(store.message.contains("age"));
                assert_eq!(store.code, None);
            }
            other => panic!("expected query error, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_error_keeps_message() {
        let err = schema_error(sqlx::Error::Protocol("unexpected".to_string()));
        assert!(matches!(&err, AppError::Schema(s) if s.message.contains("unexpected")));
    }

    #[test]
    fn test_primary_code_of_extended_code() {
        // SQLITE_IOERR_READ = 266
        assert_eq!(primary_code("266"), SQLITE_IOERR);
        assert_eq!(primary_code("14"), SQLITE_CANTOPEN);
        assert_eq!(primary_code("2067"), "");
    }
}
