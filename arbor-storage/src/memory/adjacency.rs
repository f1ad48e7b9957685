use crate::{AdjacencyTable, StorageResult};
use arbor_types::EntityId;
use std::collections::{HashMap, HashSet};

/// Adjacency table keeping, per parent, its children sorted by position.
#[derive(Debug, Default)]
pub struct MemoryAdjacencyTable {
    children: HashMap<EntityId, Vec<(u32, EntityId)>>,
}

impl MemoryAdjacencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }
}

impl AdjacencyTable for MemoryAdjacencyTable {
    fn children_of(&self, parent: EntityId) -> StorageResult<Vec<EntityId>> {
        Ok(self
            .children
            .get(&parent)
            .map(|siblings| siblings.iter().map(|(_, child)| *child).collect())
            .unwrap_or_default())
    }

    fn all_children(&self) -> StorageResult<HashSet<EntityId>> {
        Ok(self
            .children
            .values()
            .flat_map(|siblings| siblings.iter().map(|(_, child)| *child))
            .collect())
    }

    fn parents_of(&self, child: EntityId) -> StorageResult<HashSet<EntityId>> {
        Ok(self
            .children
            .iter()
            .filter(|(_, siblings)| siblings.iter().any(|(_, c)| *c == child))
            .map(|(parent, _)| *parent)
            .collect())
    }

    fn insert_at(&mut self, child: EntityId, parent: EntityId, order: u32) -> StorageResult<()> {
        let siblings = self.children.entry(parent).or_default();
        siblings.retain(|(_, c)| *c != child);
        if siblings.iter().any(|(o, _)| *o == order) {
            for (o, _) in siblings.iter_mut().filter(|(o, _)| *o >= order) {
                *o += 1;
            }
        }
        siblings.push((order, child));
        siblings.sort_by_key(|(o, _)| *o);
        Ok(())
    }

    fn remove_edge(&mut self, child: EntityId, parent: EntityId) -> StorageResult<()> {
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|(_, c)| *c != child);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
        Ok(())
    }

    fn purge(&mut self, id: EntityId) -> StorageResult<()> {
        self.children.remove(&id);
        for siblings in self.children.values_mut() {
            siblings.retain(|(_, c)| *c != id);
        }
        self.children.retain(|_, siblings| !siblings.is_empty());
        Ok(())
    }
}
