//! Error types for the directory query layer.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for directory query operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised by the directory query layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// The database URI could not be parsed or used.
    #[error("invalid database URI: {reason}")]
    InvalidUri {
        /// Machine-readable reason for the rejection.
        reason: String,
    },
    /// The SQLite database file does not exist.
    #[error("database file {path} does not exist")]
    MissingDatabaseFile {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// A database operation failed.
    #[error("database operation '{operation}' failed")]
    QueryFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying SQL error.
        #[source]
        source: sqlx::Error,
    },
}

impl DataError {
    pub(crate) fn invalid_uri(reason: impl Into<String>) -> Self {
        Self::InvalidUri {
            reason: reason.into(),
        }
    }

    pub(crate) fn query(operation: &'static str) -> impl Fn(sqlx::Error) -> Self {
        move |source| Self::QueryFailed { operation, source }
    }
}
