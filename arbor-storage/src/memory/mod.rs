//! In-process implementations of the storage collaborators.
//!
//! Nothing here survives the process. Used for tests and for stores whose
//! configuration selects the `memory` backend.

mod adjacency;
mod attributes;
mod registry;

pub use adjacency::MemoryAdjacencyTable;
pub use attributes::MemoryAttributeTable;
pub use registry::MemoryRegistry;
