use crate::{AttributeTable, Namespace, StorageResult};
use arbor_model::AttributeMap;
use arbor_types::EntityId;
use std::collections::{HashMap, HashSet};

/// Attribute table for one namespace, held in a hash map per id.
#[derive(Debug)]
pub struct MemoryAttributeTable {
    namespace: Namespace,
    rows: HashMap<EntityId, AttributeMap>,
}

impl MemoryAttributeTable {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            rows: HashMap::new(),
        }
    }
}

impl AttributeTable for MemoryAttributeTable {
    fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn set(&mut self, id: EntityId, key: &str, value: &str) -> StorageResult<()> {
        if value.is_empty() {
            if let Some(attrs) = self.rows.get_mut(&id) {
                attrs.remove(key);
                if attrs.is_empty() {
                    self.rows.remove(&id);
                }
            }
        } else {
            self.rows
                .entry(id)
                .or_default()
                .insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn get(&self, ids: &[EntityId]) -> StorageResult<HashMap<EntityId, AttributeMap>> {
        Ok(ids
            .iter()
            .map(|id| (*id, self.rows.get(id).cloned().unwrap_or_default()))
            .collect())
    }

    fn values_of(&self, key: &str) -> StorageResult<HashMap<EntityId, String>> {
        Ok(self
            .rows
            .iter()
            .filter_map(|(id, attrs)| attrs.get(key).map(|v| (*id, v.clone())))
            .collect())
    }

    fn filter(&self, criteria: &AttributeMap) -> StorageResult<HashSet<EntityId>> {
        if criteria.is_empty() {
            return Ok(HashSet::new());
        }
        Ok(self
            .rows
            .iter()
            .filter(|(_, attrs)| criteria.iter().all(|(k, v)| attrs.get(k) == Some(v)))
            .map(|(id, _)| *id)
            .collect())
    }

    fn clear(&mut self, id: EntityId) -> StorageResult<()> {
        self.rows.remove(&id);
        Ok(())
    }
}
