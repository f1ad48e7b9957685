//! The metadata store orchestrator.
//!
//! [`MetadataStore`] is the public surface. It composes the registry, the
//! two attribute tables and the adjacency table, and keeps them consistent
//! under structural edits. Every operation first brings the session up to
//! date with the configuration source.

use crate::config::{ConfigSource, DatabaseConfig, MemoryConfigSource};
use crate::error::{MetadataError, MetadataResult};
use crate::session::Session;
use crate::tree;
use arbor_model::keys::private;
use arbor_model::{AttributeMap, Entity, EntityMetadata, EntityWithChildren};
use arbor_storage::{Namespace, Tables};
use arbor_types::{EntityId, EntityKind, KindFilter};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Hierarchical EAV metadata store.
///
/// All operations run under one lock, so a cascade never interleaves with
/// another call and a configuration rebuild is never observed half-done.
pub struct MetadataStore {
    source: Arc<dyn ConfigSource>,
    session: Mutex<Session>,
}

impl MetadataStore {
    /// Creates a store bound to `source` and initializes it eagerly.
    pub fn new(source: Arc<dyn ConfigSource>) -> MetadataResult<Self> {
        let store = Self {
            source,
            session: Mutex::new(Session::new()),
        };
        store.ensure_fresh()?;
        Ok(store)
    }

    /// A store backed by in-process tables.
    pub fn in_memory() -> MetadataResult<Self> {
        Self::new(Arc::new(MemoryConfigSource::new(DatabaseConfig::memory())))
    }

    /// Rebuilds the collaborators if the configuration changed.
    pub fn ensure_fresh(&self) -> MetadataResult<()> {
        self.with_tables(|_| Ok(()))
    }

    /// Configuration timestamp the current collaborators were built against.
    pub fn initialized_at(&self) -> u64 {
        self.lock().initialized_at()
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Registers a new entity and applies `metadata` to it, if given.
    pub fn add_entity(
        &self,
        kind: EntityKind,
        metadata: Option<&EntityMetadata>,
    ) -> MetadataResult<EntityId> {
        self.with_tables(|tables| {
            let id = tables.registry.create(kind)?;
            if let Some(metadata) = metadata {
                apply_diff(tables, id, metadata)?;
            }
            debug!(entity = %id, %kind, "Added entity");
            Ok(id)
        })
    }

    /// Removes an entity. Removing a table removes its whole subtree.
    ///
    /// A storage failure part way through leaves the removal partially
    /// applied.
    pub fn remove_entity(&self, id: EntityId) -> MetadataResult<()> {
        self.with_tables(|tables| {
            let order = tree::removal_order(tables, id)?;
            for victim in &order {
                tree::remove_one(tables, *victim)?;
            }
            debug!(entity = %id, removed = order.len(), "Removed entity");
            Ok(())
        })
    }

    /// Merges `diff` into the entity's attributes.
    ///
    /// Keys absent from the diff are untouched; an empty value removes the
    /// key.
    pub fn update_entity(&self, id: EntityId, diff: &EntityMetadata) -> MetadataResult<()> {
        self.with_tables(|tables| {
            tree::require_kind(tables, id)?;
            apply_diff(tables, id, diff)?;
            debug!(
                entity = %id,
                public = diff.public.len(),
                private = diff.private.len(),
                "Updated entity"
            );
            Ok(())
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns one entity, or `None` if the id is not registered.
    pub fn get_entity(&self, id: EntityId) -> MetadataResult<Option<Entity>> {
        let mut entities = self.get_entities_by_id(&[id])?;
        Ok(entities.pop().filter(Entity::exists))
    }

    /// Returns entities in the order of `ids`.
    ///
    /// Unknown ids yield an entity whose `kind` is `None`.
    pub fn get_entities_by_id(&self, ids: &[EntityId]) -> MetadataResult<Vec<Entity>> {
        self.with_tables(|tables| fetch_entities(tables, ids))
    }

    /// Returns entities together with their ordered child ids.
    pub fn get_entities_with_children(
        &self,
        ids: &[EntityId],
    ) -> MetadataResult<Vec<EntityWithChildren>> {
        self.with_tables(|tables| {
            fetch_entities(tables, ids)?
                .into_iter()
                .map(|entity| {
                    let children = tables.hierarchy.children_of(entity.id)?;
                    Ok(EntityWithChildren::new(entity, children))
                })
                .collect()
        })
    }

    /// Ids whose attributes match `criteria`, restricted to `kind`.
    ///
    /// Public and private criteria are intersected. Without criteria every
    /// id of the requested kind matches.
    pub fn get_entity_ids_by_metadata(
        &self,
        criteria: Option<&EntityMetadata>,
        kind: KindFilter,
    ) -> MetadataResult<HashSet<EntityId>> {
        self.with_tables(|tables| {
            let public = criteria.map(|c| &c.public).filter(|m| !m.is_empty());
            let private = criteria.map(|c| &c.private).filter(|m| !m.is_empty());

            let candidates = match (public, private) {
                (Some(public), Some(private)) => {
                    let matched = tables.public.filter(public)?;
                    let restricted = tables.private.filter(private)?;
                    matched.intersection(&restricted).copied().collect()
                }
                (Some(public), None) => tables.public.filter(public)?,
                (None, Some(private)) => tables.private.filter(private)?,
                (None, None) => match kind {
                    KindFilter::Any => tables.registry.all_ids()?.into_iter().collect(),
                    KindFilter::Only(kind) => return Ok(tables.registry.ids_by_kind(kind)?),
                },
            };

            match kind {
                KindFilter::Any => Ok(candidates),
                KindFilter::Only(kind) => {
                    let of_kind = tables.registry.ids_by_kind(kind)?;
                    Ok(candidates.intersection(&of_kind).copied().collect())
                }
            }
        })
    }

    /// Distinct values of a public attribute across all entities.
    pub fn get_unique_public_values(&self, key: &str) -> MetadataResult<HashSet<String>> {
        self.with_tables(|tables| Ok(tables.public.values_of(key)?.into_values().collect()))
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// Deep-copies an entity and returns the copy's id.
    ///
    /// Columns are shared rather than copied, so copying one returns its own
    /// id. A copied table becomes a category.
    pub fn copy_entity(&self, id: EntityId) -> MetadataResult<EntityId> {
        self.with_tables(|tables| {
            let copy = tree::copy_subtree(tables, id)?;
            debug!(entity = %id, copy = %copy, "Copied entity");
            Ok(copy)
        })
    }

    /// Attaches `child` under `parent` at sibling position `order` and
    /// returns the id that was attached.
    ///
    /// A non-column child that already has a parent is deep-copied first and
    /// the copy is attached instead, so the returned id differs from `child`.
    pub fn add_child(
        &self,
        child: EntityId,
        parent: EntityId,
        order: u32,
    ) -> MetadataResult<EntityId> {
        self.with_tables(|tables| {
            if child == parent {
                return Err(MetadataError::InvalidOperation(format!(
                    "entity {child} cannot be attached under itself"
                )));
            }
            let kind = tree::require_kind(tables, child)?;
            tree::require_kind(tables, parent)?;

            let attached = if kind.is_shareable() || tables.hierarchy.parents_of(child)?.is_empty() {
                if tree::is_ancestor_or_self(tables, child, parent)? {
                    return Err(MetadataError::InvalidOperation(format!(
                        "entity {child} is an ancestor of {parent}; attaching it would create a cycle"
                    )));
                }
                child
            } else {
                tree::copy_subtree(tables, child)?
            };

            tables.hierarchy.insert_at(attached, parent, order)?;
            debug!(child = %child, attached = %attached, parent = %parent, order, "Attached child");
            Ok(attached)
        })
    }

    /// Detaches `child` from `parent`.
    ///
    /// Children of a table are structural and cannot be detached one at a
    /// time; remove the table instead.
    pub fn remove_child(&self, child: EntityId, parent: EntityId) -> MetadataResult<()> {
        self.with_tables(|tables| {
            if let Some(kind) = tables.registry.type_of(parent)? {
                if !kind.allows_child_removal() {
                    return Err(MetadataError::InvalidOperation(format!(
                        "cannot detach {child} from {kind} {parent}; remove the table instead"
                    )));
                }
            }
            tables.hierarchy.remove_edge(child, parent)?;
            debug!(child = %child, parent = %parent, "Detached child");
            Ok(())
        })
    }

    /// Children of `parent` in sibling order.
    ///
    /// `None` addresses the root: every registered id that is nobody's
    /// child, ascending.
    pub fn get_child_ids(&self, parent: Option<EntityId>) -> MetadataResult<Vec<EntityId>> {
        self.with_tables(|tables| match parent {
            Some(parent) => Ok(tables.hierarchy.children_of(parent)?),
            None => {
                let children = tables.hierarchy.all_children()?;
                Ok(tables
                    .registry
                    .all_ids()?
                    .into_iter()
                    .filter(|id| !children.contains(id))
                    .collect())
            }
        })
    }

    pub fn get_parent_ids(&self, id: EntityId) -> MetadataResult<HashSet<EntityId>> {
        self.with_tables(|tables| Ok(tables.hierarchy.parents_of(id)?))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| {
            warn!("Metadata store lock was poisoned; continuing with possibly partial state");
            poisoned.into_inner()
        })
    }

    fn with_tables<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> MetadataResult<T>,
    ) -> MetadataResult<T> {
        let mut session = self.lock();
        let tables = session.ensure_fresh(self.source.as_ref())?;
        f(tables)
    }
}

/// Writes every pair of `diff`, skipping transient private keys.
fn apply_diff(tables: &mut Tables, id: EntityId, diff: &EntityMetadata) -> MetadataResult<()> {
    for (key, value) in &diff.public {
        tables.public.set(id, key, value)?;
    }
    for (key, value) in &diff.private {
        if private::is_transient(key) {
            debug!(entity = %id, key = %key, "Dropping transient private key");
            continue;
        }
        tables.private.set(id, key, value)?;
    }
    Ok(())
}

fn fetch_entities(tables: &Tables, ids: &[EntityId]) -> MetadataResult<Vec<Entity>> {
    let kinds = tables.registry.types_of(ids)?;
    let public = tables.attributes(Namespace::Public).get(ids)?;
    let private = tables.attributes(Namespace::Private).get(ids)?;

    Ok(ids
        .iter()
        .map(|id| {
            let metadata = EntityMetadata {
                public: attributes_for(&public, id),
                private: attributes_for(&private, id),
            };
            Entity::new(*id, kinds.get(id).copied(), metadata)
        })
        .collect())
}

/// Ids may repeat in a request, so each occurrence gets its own copy.
fn attributes_for(batch: &HashMap<EntityId, AttributeMap>, id: &EntityId) -> AttributeMap {
    batch.get(id).cloned().unwrap_or_default()
}
