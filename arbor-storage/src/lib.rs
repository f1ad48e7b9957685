//! Storage collaborators for the arbor metadata store.
//!
//! The orchestrator in `arbor-core` only talks to three narrow interfaces:
//!
//! - [`Registry`]: which ids exist and what kind each one is
//! - [`AttributeTable`]: sparse `id -> key -> value` data, one instance per
//!   [`Namespace`]
//! - [`AdjacencyTable`]: ordered parent/child edges
//!
//! Two implementations are provided. [`memory`] keeps everything in process
//! and is used for tests and ephemeral stores. [`sqlite`] persists the four
//! tables (`<prefix>_manifest`, `<prefix>_meta_public`, `<prefix>_meta_private`,
//! `<prefix>_hierarchy`) in a SQLite database.

mod adjacency;
mod attributes;
mod error;
pub mod memory;
mod registry;
pub mod sqlite;

pub use adjacency::AdjacencyTable;
pub use attributes::{AttributeTable, Namespace};
pub use error::{StorageError, StorageResult};
pub use registry::Registry;

/// The full set of collaborators bound to one backing configuration.
///
/// Built as a unit so that callers never observe a mix of tables from two
/// different configurations.
pub struct Tables {
    pub registry: Box<dyn Registry>,
    pub public: Box<dyn AttributeTable>,
    pub private: Box<dyn AttributeTable>,
    pub hierarchy: Box<dyn AdjacencyTable>,
}

impl Tables {
    /// Fresh, empty in-process tables.
    pub fn in_memory() -> Self {
        Self {
            registry: Box::new(memory::MemoryRegistry::new()),
            public: Box::new(memory::MemoryAttributeTable::new(Namespace::Public)),
            private: Box::new(memory::MemoryAttributeTable::new(Namespace::Private)),
            hierarchy: Box::new(memory::MemoryAdjacencyTable::new()),
        }
    }

    /// Returns the attribute table for a namespace.
    pub fn attributes(&self, namespace: Namespace) -> &dyn AttributeTable {
        match namespace {
            Namespace::Public => self.public.as_ref(),
            Namespace::Private => self.private.as_ref(),
        }
    }

    /// Returns the attribute table for a namespace, mutably.
    pub fn attributes_mut(&mut self, namespace: Namespace) -> &mut dyn AttributeTable {
        match namespace {
            Namespace::Public => self.public.as_mut(),
            Namespace::Private => self.private.as_mut(),
        }
    }
}
