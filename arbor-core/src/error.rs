//! Error types for the metadata store.

use arbor_storage::StorageError;
use thiserror::Error;

/// Result type for metadata store operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors that can occur in metadata store operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The backing configuration is unreachable, legacy, or its storage
    /// could not be opened. Needs operator action before retrying.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// A structurally disallowed mutation. Nothing was changed.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The stored hierarchy is not a tree where it must be one.
    #[error("hierarchy integrity violation: {0}")]
    Integrity(String),

    /// Storage failure. A cascading operation may have been partially
    /// applied; re-query before retrying.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A blocking task spawned by the async handle panicked or was cancelled.
    #[error("background task failed: {0}")]
    TaskJoin(String),
}
