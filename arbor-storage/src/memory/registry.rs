use crate::{Registry, StorageResult};
use arbor_types::{EntityId, EntityKind};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Registry backed by an ordered map and a monotonically increasing counter.
#[derive(Debug)]
pub struct MemoryRegistry {
    next_id: i64,
    entries: BTreeMap<EntityId, EntityKind>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for MemoryRegistry {
    fn create(&mut self, kind: EntityKind) -> StorageResult<EntityId> {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, kind);
        Ok(id)
    }

    fn delete(&mut self, id: EntityId) -> StorageResult<()> {
        self.entries.remove(&id);
        Ok(())
    }

    fn types_of(&self, ids: &[EntityId]) -> StorageResult<HashMap<EntityId, EntityKind>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.entries.get(id).map(|kind| (*id, *kind)))
            .collect())
    }

    fn ids_by_kind(&self, kind: EntityKind) -> StorageResult<HashSet<EntityId>> {
        Ok(self
            .entries
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| *id)
            .collect())
    }

    fn all_ids(&self) -> StorageResult<Vec<EntityId>> {
        Ok(self.entries.keys().copied().collect())
    }
}
