use crate::StorageResult;
use arbor_types::{EntityId, EntityKind};
use std::collections::{HashMap, HashSet};

/// The authority on which entity ids exist and their kinds.
pub trait Registry: Send {
    /// Allocates a fresh id for a new entity of `kind`.
    ///
    /// Ids are never reused, even after the entity is deleted.
    fn create(&mut self, kind: EntityKind) -> StorageResult<EntityId>;

    /// Removes an id. Deleting an absent id is a no-op.
    fn delete(&mut self, id: EntityId) -> StorageResult<()>;

    /// Batch kind lookup. Unknown ids are absent from the result.
    fn types_of(&self, ids: &[EntityId]) -> StorageResult<HashMap<EntityId, EntityKind>>;

    /// All ids registered with the given kind.
    fn ids_by_kind(&self, kind: EntityKind) -> StorageResult<HashSet<EntityId>>;

    /// Every registered id, ascending.
    fn all_ids(&self) -> StorageResult<Vec<EntityId>>;

    /// Kind of a single id, `None` when it is not registered.
    fn type_of(&self, id: EntityId) -> StorageResult<Option<EntityKind>> {
        Ok(self.types_of(&[id])?.remove(&id))
    }
}
