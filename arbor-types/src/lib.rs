//! Core type definitions for arbor.
//!
//! This crate defines the fundamental types shared by every layer of the
//! metadata store:
//! - Entity identifiers, allocated by the registry
//! - Entity kinds (hierarchy, table, category, column) and the rules that
//!   hang off them
//! - The kind filter used by metadata queries, including the `Any` wildcard
//!
//! Attribute maps and the assembled `Entity` live in `arbor-model`.

mod ids;
mod kind;

pub use ids::EntityId;
pub use kind::{EntityKind, KindFilter};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid entity kind code: {0}")]
    InvalidKindCode(i32),

    #[error("invalid entity id: {0}")]
    InvalidId(String),
}
