//! Error types for the store
//!
//! Every DAO operation returns a [`StoreError`] whose variant tells the
//! caller which kind of failure happened, so the HTTP layer can map it to a
//! response code without inspecting driver errors.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Error raised by the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Payload or page request failed structural validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// No row matched the requested identifier
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A unique constraint was violated
    #[error("{entity} conflict: {message}")]
    Conflict {
        entity: &'static str,
        message: String,
    },

    /// A foreign key target does not exist
    #[error("{entity} references a missing row: {message}")]
    ReferenceViolation {
        entity: &'static str,
        message: String,
    },

    /// Any other failure surfaced by the database
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify an error returned by a write statement against `entity`'s table.
    pub(crate) fn from_write(entity: &'static str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return StoreError::Conflict {
                        entity,
                        message: db_err.message().to_string(),
                    };
                }
                ErrorKind::ForeignKeyViolation => {
                    return StoreError::ReferenceViolation {
                        entity,
                        message: db_err.message().to_string(),
                    };
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<String> for StoreError {
    fn from(message: String) -> Self {
        StoreError::Validation(message)
    }
}

/// Type alias for results returned by the store
pub type StoreResult<T> = Result<T, StoreError>;
