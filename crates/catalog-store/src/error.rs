//! Error types for the storage layer.

use catalog_core::{TvId, ValidationError};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record was missing required fields or carried invalid ones.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The submitted version is not the stored one. Nothing was written.
    #[error(
        "version conflict for tv {id}: latest stored version is {stored}, submitted version is {submitted}"
    )]
    VersionConflict {
        id: TvId,
        submitted: u64,
        stored: u64,
    },

    /// The filter did not identify a single record where one was required.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// A stored row could not be turned back into a record.
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
