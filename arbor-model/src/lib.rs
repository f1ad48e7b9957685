//! Entity model for arbor.
//!
//! Defines the values that flow in and out of the metadata store:
//! - [`Entity`]: id, kind and the two attribute namespaces
//! - [`EntityMetadata`]: a public/private attribute diff or snapshot
//! - [`EntityWithChildren`]: an entity plus its ordered child ids
//! - [`keys`]: the recognized attribute keys and [`DataType`] values
//!
//! The public namespace is visible to any consumer. The private namespace
//! holds connection and query details and must stay behind the trusted
//! boundary; [`Entity::without_private`] produces the outward view.

mod entity;
pub mod keys;
mod metadata;

pub use entity::{Entity, EntityWithChildren, filter_entities};
pub use keys::DataType;
pub use metadata::{AttributeMap, EntityMetadata};

/// Errors produced by model conversions.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown data type: {0}")]
    UnknownDataType(String),
}
