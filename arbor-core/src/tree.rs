//! Structural algorithms over the adjacency table.
//!
//! The hierarchy is logically a tree but physically an edge list, so every
//! walk here uses an explicit stack and a seen-set: depth is bounded only by
//! the data, and a corrupted (cyclic) edge list must not hang the store.

use crate::error::{MetadataError, MetadataResult};
use arbor_model::EntityMetadata;
use arbor_storage::{Namespace, Tables};
use arbor_types::{EntityId, EntityKind};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Ids to remove for `removeEntity(root)`, descendants before ancestors.
///
/// Children are only followed below a kind that cascades on delete; once
/// inside such a subtree everything beneath it is collected.
pub(crate) fn removal_order(tables: &Tables, root: EntityId) -> MetadataResult<Vec<EntityId>> {
    let mut seen = HashSet::new();
    let mut discovered = Vec::new();
    let mut stack = vec![(root, false)];

    while let Some((id, inside_cascade)) = stack.pop() {
        if !seen.insert(id) {
            debug!(entity = %id, "Already scheduled for removal");
            continue;
        }
        discovered.push(id);

        let cascades = inside_cascade
            || tables
                .registry
                .type_of(id)?
                .is_some_and(EntityKind::cascades_on_delete);
        if cascades {
            for child in tables.hierarchy.children_of(id)? {
                stack.push((child, true));
            }
        }
    }

    discovered.reverse();
    Ok(discovered)
}

/// Removes a single entity: attributes, then edges, then the registry row.
pub(crate) fn remove_one(tables: &mut Tables, id: EntityId) -> MetadataResult<()> {
    for namespace in Namespace::BOTH {
        tables.attributes_mut(namespace).clear(id)?;
    }
    tables.hierarchy.purge(id)?;
    tables.registry.delete(id)?;
    Ok(())
}

/// Deep-copies `id` and returns the copy's id.
///
/// Columns are returned unchanged. Any other entity gets a new id of its
/// copy kind with the same attributes, and its children are copied in
/// sibling order and attached to the copy. Columns below it are shared,
/// not duplicated.
pub(crate) fn copy_subtree(tables: &mut Tables, id: EntityId) -> MetadataResult<EntityId> {
    let kind = require_kind(tables, id)?;
    if kind.is_shareable() {
        return Ok(id);
    }

    let root_copy = duplicate(tables, id, kind)?;
    let mut seen = HashSet::from([id]);
    let mut stack = vec![(id, root_copy)];

    while let Some((original, copy)) = stack.pop() {
        let children = tables.hierarchy.children_of(original)?;
        let kinds = tables.registry.types_of(&children)?;

        for (position, child) in children.into_iter().enumerate() {
            let Some(child_kind) = kinds.get(&child).copied() else {
                warn!(parent = %original, child = %child, "Skipping edge to unregistered entity while copying");
                continue;
            };
            let attached = if child_kind.is_shareable() {
                child
            } else {
                if !seen.insert(child) {
                    return Err(MetadataError::Integrity(format!(
                        "entity {child} reached twice while copying {id}; the hierarchy is not a tree"
                    )));
                }
                let child_copy = duplicate(tables, child, child_kind)?;
                stack.push((child, child_copy));
                child_copy
            };
            tables.hierarchy.insert_at(attached, copy, position as u32)?;
        }
    }

    Ok(root_copy)
}

/// Creates a new entity with the copy kind and attributes of `id`.
fn duplicate(tables: &mut Tables, id: EntityId, kind: EntityKind) -> MetadataResult<EntityId> {
    let copy = tables.registry.create(kind.copy_kind())?;
    let metadata = read_metadata(tables, id)?;
    for (key, value) in &metadata.public {
        tables.public.set(copy, key, value)?;
    }
    for (key, value) in &metadata.private {
        tables.private.set(copy, key, value)?;
    }
    Ok(copy)
}

fn read_metadata(tables: &Tables, id: EntityId) -> MetadataResult<EntityMetadata> {
    let mut public = tables.public.get(&[id])?;
    let mut private = tables.private.get(&[id])?;
    Ok(EntityMetadata {
        public: public.remove(&id).unwrap_or_default(),
        private: private.remove(&id).unwrap_or_default(),
    })
}

/// True if `candidate` is `id` itself or one of its ancestors.
pub(crate) fn is_ancestor_or_self(
    tables: &Tables,
    candidate: EntityId,
    id: EntityId,
) -> MetadataResult<bool> {
    let mut seen = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if current == candidate {
            return Ok(true);
        }
        if seen.insert(current) {
            stack.extend(tables.hierarchy.parents_of(current)?);
        }
    }
    Ok(false)
}

/// Kind of `id`, or an invalid-operation error if it is not registered.
pub(crate) fn require_kind(tables: &Tables, id: EntityId) -> MetadataResult<EntityKind> {
    tables
        .registry
        .type_of(id)?
        .ok_or_else(|| MetadataError::InvalidOperation(format!("entity {id} does not exist")))
}
