//! Hierarchical entity-attribute-value metadata store.
//!
//! Entities (tables, categories, columns and hierarchy roots) carry a public
//! and a private attribute namespace and are arranged in a tree with ordered
//! siblings. [`MetadataStore`] keeps the registry, attribute tables and
//! adjacency table consistent under structural edits:
//!
//! - removing a table removes its whole subtree
//! - attaching an entity that already has a parent attaches a deep copy,
//!   except for columns, which are shared
//! - attribute search intersects the public and private namespaces
//!
//! The store watches a [`ConfigSource`] and rebuilds its storage when the
//! configuration changes.
//!
//! ```no_run
//! use arbor_core::MetadataStore;
//! use arbor_model::EntityMetadata;
//! use arbor_types::EntityKind;
//!
//! # fn main() -> arbor_core::MetadataResult<()> {
//! let store = MetadataStore::in_memory()?;
//! let table = store.add_entity(
//!     EntityKind::DataTable,
//!     Some(&EntityMetadata::new().with_public("title", "Parcels")),
//! )?;
//! let column = store.add_entity(EntityKind::Column, None)?;
//! store.add_child(column, table, 0)?;
//! assert_eq!(store.get_child_ids(Some(table))?, vec![column]);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handle;
mod session;
mod store;
mod tree;

pub use config::{
    BackendConfig, CONFIG_VERSION, ConfigError, ConfigResult, ConfigSource, DEFAULT_TABLE_PREFIX,
    DatabaseConfig, FileConfigSource, MemoryConfigSource,
};
pub use error::{MetadataError, MetadataResult};
pub use handle::StoreHandle;
pub use session::Session;
pub use store::MetadataStore;
