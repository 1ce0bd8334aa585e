//! Store error types

use thiserror::Error;

use crate::db::DbError;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// An id, or a referenced parent id, does not resolve
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A query that must produce a record matched nothing
    #[error("{0}")]
    NoMatch(String),

    /// Uniqueness or dependency violation
    #[error("{0}")]
    Conflict(String),

    /// A rule that depends on stored state failed
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Db(DbError::Sqlite(err))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
