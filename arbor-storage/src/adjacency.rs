use crate::StorageResult;
use arbor_types::EntityId;
use std::collections::HashSet;

/// Ordered parent/child edges.
///
/// Each edge carries a sibling position that is unique among the children
/// of its parent.
pub trait AdjacencyTable: Send {
    /// Children of `parent` in sibling order.
    fn children_of(&self, parent: EntityId) -> StorageResult<Vec<EntityId>>;

    /// Every id that appears as a child of some edge.
    fn all_children(&self) -> StorageResult<HashSet<EntityId>>;

    /// Parents of `child`.
    fn parents_of(&self, child: EntityId) -> StorageResult<HashSet<EntityId>>;

    /// Inserts `child` under `parent` at sibling position `order`.
    ///
    /// If the position is taken, that sibling and every later one move down
    /// by one. An existing edge between the same pair is moved rather than
    /// duplicated.
    fn insert_at(&mut self, child: EntityId, parent: EntityId, order: u32) -> StorageResult<()>;

    /// Removes the edge between `child` and `parent`. No-op if absent.
    fn remove_edge(&mut self, child: EntityId, parent: EntityId) -> StorageResult<()>;

    /// Removes every edge where `id` is the parent or the child.
    fn purge(&mut self, id: EntityId) -> StorageResult<()>;
}
