use crate::metadata::{AttributeMap, EntityMetadata};
use arbor_types::{EntityId, EntityKind, KindFilter};
use serde::{Deserialize, Serialize};

/// An entity as returned by the metadata store.
///
/// `kind` is `None` when the id has no registry entry; callers treat that
/// as "entity not found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: Option<EntityKind>,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Entity {
    pub fn new(id: EntityId, kind: Option<EntityKind>, metadata: EntityMetadata) -> Self {
        Self { id, kind, metadata }
    }

    /// Returns true if the registry knows this id.
    pub fn exists(&self) -> bool {
        self.kind.is_some()
    }

    pub fn public_metadata(&self) -> &AttributeMap {
        &self.metadata.public
    }

    pub fn private_metadata(&self) -> &AttributeMap {
        &self.metadata.private
    }

    /// Looks up a public attribute value.
    pub fn public_value(&self, key: &str) -> Option<&str> {
        self.metadata.public.get(key).map(String::as_str)
    }

    /// Looks up a private attribute value.
    pub fn private_value(&self, key: &str) -> Option<&str> {
        self.metadata.private.get(key).map(String::as_str)
    }

    /// The view handed to untrusted consumers: the private namespace is
    /// dropped entirely.
    #[must_use]
    pub fn without_private(mut self) -> Self {
        self.metadata.private.clear();
        self
    }
}

/// An entity together with its child ids in sibling order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityWithChildren {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(rename = "childIds")]
    pub child_ids: Vec<EntityId>,
}

impl EntityWithChildren {
    pub fn new(entity: Entity, child_ids: Vec<EntityId>) -> Self {
        Self { entity, child_ids }
    }
}

/// Filters already-fetched entities by kind and exact public attribute
/// values.
///
/// Every pair in `criteria` must be present with an equal value. Entities
/// with no registry entry never match a specific kind filter.
pub fn filter_entities<'a, I>(entities: I, criteria: &AttributeMap, kind: KindFilter) -> Vec<Entity>
where
    I: IntoIterator<Item = &'a Entity>,
{
    entities
        .into_iter()
        .filter(|entity| match (kind, entity.kind) {
            (KindFilter::Any, _) => true,
            (KindFilter::Only(wanted), Some(actual)) => wanted == actual,
            (KindFilter::Only(_), None) => false,
        })
        .filter(|entity| {
            criteria
                .iter()
                .all(|(key, value)| entity.metadata.public.get(key) == Some(value))
        })
        .cloned()
        .collect()
}
