//! Repository Module
//!
//! Module-level CRUD functions over the SQLite pool, one module per
//! aggregate. Queries are runtime-bound (`query_as` + `bind`).

// Catalog
pub mod dish;
pub mod restaurant;

// Orders
pub mod order;
pub mod payment_attempt;

// System
pub mod system_issue;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => crate::utils::AppError::not_found(msg),
            RepoError::Validation(msg) => crate::utils::AppError::validation(msg),
            RepoError::Database(msg) => crate::utils::AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
