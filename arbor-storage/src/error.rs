//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be interpreted (e.g. an unknown type code).
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A configured table prefix is not a safe SQL identifier.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
