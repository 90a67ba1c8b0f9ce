//! Translation of pool and Diesel failures into repository errors.
//!
//! Database messages are logged at debug level and kept out of the returned
//! error text, which may end up in a response's debug field.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::FeedbackRepositoryError;

use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> FeedbackRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            FeedbackRepositoryError::connection(message)
        }
    }
}

pub(crate) fn map_diesel_error(error: DieselError) -> FeedbackRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            FeedbackRepositoryError::connection("database connection lost")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            FeedbackRepositoryError::query("feedback violates a table constraint")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            FeedbackRepositoryError::query("concurrent update conflict")
        }
        DieselError::NotFound => FeedbackRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => {
            FeedbackRepositoryError::query("database query error")
        }
        _ => FeedbackRepositoryError::query("database error"),
    }
}
