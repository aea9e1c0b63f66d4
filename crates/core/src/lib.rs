//! Shared primitives for all Rust crates in rolesync.

#![forbid(unsafe_code)]

/// Validated SQL identifiers shared across layers.
pub mod identifier;

use thiserror::Error;

pub use identifier::{IDENTIFIER_MAX_LENGTH, Identifier};

/// Result type used across rolesync crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Desired-state input violates a precondition.
    #[error("validation error: {0}")]
    Validation(String),

    /// A catalog row the current code path relies on does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Statement execution or connection failure reported by the database.
    #[error("database error: {0}")]
    Database(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns a stable machine-readable name for the error category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Database(_) => "database",
            Self::Internal(_) => "internal",
        }
    }
}
