use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::entities::topic::InvalidStatus;

/// Errors raised by the hierarchy repository.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Input rejected before touching the database
    #[error("{0}")]
    Validation(String),

    /// A unique constraint was violated
    #[error("Record already exists")]
    Duplicate,

    /// The parent row referenced by an insert does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Classifies a failed insert. `parent` names the entity the new row
    /// points at, used when the foreign key does not resolve.
    pub fn from_insert(err: DbErr, parent: &'static str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::Duplicate,
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => RepositoryError::NotFound(parent),
            _ => RepositoryError::Database(err),
        }
    }
}

impl From<InvalidStatus> for RepositoryError {
    fn from(_: InvalidStatus) -> Self {
        RepositoryError::Validation("Invalid status".to_string())
    }
}

/// Type alias for Result with RepositoryError
pub type Result<T> = std::result::Result<T, RepositoryError>;
