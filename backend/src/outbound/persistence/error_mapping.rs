//! Diesel and pool error mapping shared by every port the adapter serves.
//!
//! Each port error type exposes `connection` and `query` constructors; these
//! helpers pick between them so the adapter does not repeat the match.

use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure through the port's connection constructor.
pub(super) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    connection(error.message().to_owned())
}

/// Map a Diesel failure, logging the driver detail at debug level.
pub(super) fn map_diesel_error<E>(
    error: diesel::result::Error,
    operation: &str,
    query: impl FnOnce(String) -> E,
    connection: impl FnOnce(String) -> E,
) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(%error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection(format!("{operation}: database connection closed"))
        }
        DieselError::NotFound => query(format!("{operation}: record not found")),
        DieselError::QueryBuilderError(_) => query(format!("{operation}: invalid query")),
        _ => query(format!("{operation}: database error")),
    }
}
