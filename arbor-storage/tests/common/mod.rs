//! Behaviour every storage backend must share. Each backend's test file
//! calls these with its own `Tables`.

use arbor_model::AttributeMap;
use arbor_storage::{Namespace, Tables};
use arbor_types::{EntityId, EntityKind};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

pub fn set_of(ids: &[EntityId]) -> HashSet<EntityId> {
    ids.iter().copied().collect()
}

fn criteria(pairs: &[(&str, &str)]) -> AttributeMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ── Registry ─────────────────────────────────────────────────────

pub fn registry_allocates_unique_ids(mut t: Tables) {
    let a = t.registry.create(EntityKind::DataTable).unwrap();
    let b = t.registry.create(EntityKind::Column).unwrap();
    assert_ne!(a, b);
    t.registry.delete(b).unwrap();
    let c = t.registry.create(EntityKind::Column).unwrap();
    assert_ne!(c, a);
    assert_ne!(c, b, "ids must not be reused after deletion");
}

pub fn registry_type_lookups(mut t: Tables) {
    let table = t.registry.create(EntityKind::DataTable).unwrap();
    let column = t.registry.create(EntityKind::Column).unwrap();
    let missing = EntityId::new(10_000);

    assert_eq!(t.registry.type_of(table).unwrap(), Some(EntityKind::DataTable));
    assert_eq!(t.registry.type_of(missing).unwrap(), None);

    let types = t.registry.types_of(&[table, column, missing]).unwrap();
    assert_eq!(types.len(), 2);
    assert_eq!(types[&column], EntityKind::Column);
    assert!(!types.contains_key(&missing));
}

pub fn registry_ids_by_kind_and_all(mut t: Tables) {
    let c1 = t.registry.create(EntityKind::Column).unwrap();
    let table = t.registry.create(EntityKind::DataTable).unwrap();
    let c2 = t.registry.create(EntityKind::Column).unwrap();

    assert_eq!(t.registry.ids_by_kind(EntityKind::Column).unwrap(), set_of(&[c1, c2]));
    assert!(t.registry.ids_by_kind(EntityKind::Hierarchy).unwrap().is_empty());
    assert_eq!(t.registry.all_ids().unwrap(), vec![c1, table, c2]);

    t.registry.delete(table).unwrap();
    t.registry.delete(table).unwrap();
    assert_eq!(t.registry.all_ids().unwrap(), vec![c1, c2]);
}

// ── Attribute tables ─────────────────────────────────────────────

pub fn attributes_set_get_overwrite(mut t: Tables) {
    let id = t.registry.create(EntityKind::Column).unwrap();
    let other = t.registry.create(EntityKind::Column).unwrap();
    let attrs = t.attributes_mut(Namespace::Public);
    attrs.set(id, "title", "Old").unwrap();
    attrs.set(id, "title", "New").unwrap();
    attrs.set(id, "dataType", "number").unwrap();

    let got = attrs.get(&[id, other]).unwrap();
    assert_eq!(got[&id], criteria(&[("title", "New"), ("dataType", "number")]));
    assert!(got[&other].is_empty(), "ids without attributes map to an empty set");
}

pub fn attributes_empty_value_removes_key(mut t: Tables) {
    let id = t.registry.create(EntityKind::Column).unwrap();
    let attrs = t.attributes_mut(Namespace::Public);
    attrs.set(id, "title", "T").unwrap();
    attrs.set(id, "min", "0").unwrap();
    attrs.set(id, "title", "").unwrap();
    assert_eq!(attrs.get(&[id]).unwrap()[&id], criteria(&[("min", "0")]));
}

pub fn attributes_namespaces_are_independent(mut t: Tables) {
    let id = t.registry.create(EntityKind::Column).unwrap();
    t.public.set(id, "title", "visible").unwrap();
    t.private.set(id, "sqlTable", "hidden").unwrap();

    assert_eq!(t.public.namespace(), Namespace::Public);
    assert_eq!(t.private.namespace(), Namespace::Private);
    assert_eq!(t.public.get(&[id]).unwrap()[&id], criteria(&[("title", "visible")]));
    assert_eq!(t.private.get(&[id]).unwrap()[&id], criteria(&[("sqlTable", "hidden")]));
}

pub fn attributes_values_of(mut t: Tables) {
    let a = t.registry.create(EntityKind::Column).unwrap();
    let b = t.registry.create(EntityKind::Column).unwrap();
    let c = t.registry.create(EntityKind::Column).unwrap();
    t.public.set(a, "keyType", "fips").unwrap();
    t.public.set(b, "keyType", "zip").unwrap();
    t.public.set(c, "title", "no key type").unwrap();

    let values = t.public.values_of("keyType").unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[&a], "fips");
    assert_eq!(values[&b], "zip");
}

pub fn attributes_filter_is_conjunctive_and_exact(mut t: Tables) {
    let a = t.registry.create(EntityKind::Column).unwrap();
    let b = t.registry.create(EntityKind::Column).unwrap();
    let c = t.registry.create(EntityKind::Column).unwrap();
    for id in [a, b] {
        t.public.set(id, "dataType", "number").unwrap();
    }
    t.public.set(c, "dataType", "numbers").unwrap();
    t.public.set(a, "keyType", "fips").unwrap();
    t.public.set(b, "keyType", "zip").unwrap();

    assert_eq!(
        t.public.filter(&criteria(&[("dataType", "number")])).unwrap(),
        set_of(&[a, b])
    );
    assert_eq!(
        t.public
            .filter(&criteria(&[("dataType", "number"), ("keyType", "fips")]))
            .unwrap(),
        set_of(&[a])
    );
    assert!(t.public.filter(&criteria(&[("dataType", "num")])).unwrap().is_empty());
    assert!(t.public.filter(&AttributeMap::new()).unwrap().is_empty());
}

pub fn attributes_clear(mut t: Tables) {
    let id = t.registry.create(EntityKind::Column).unwrap();
    let keep = t.registry.create(EntityKind::Column).unwrap();
    t.public.set(id, "title", "a").unwrap();
    t.public.set(id, "min", "1").unwrap();
    t.public.set(keep, "title", "b").unwrap();
    t.public.clear(id).unwrap();

    assert!(t.public.get(&[id]).unwrap()[&id].is_empty());
    assert_eq!(t.public.values_of("title").unwrap().len(), 1);
}

// ── Adjacency ────────────────────────────────────────────────────

fn ids(n: i64) -> Vec<EntityId> {
    (1..=n).map(EntityId::new).collect()
}

pub fn adjacency_orders_children(mut t: Tables) {
    let v = ids(4);
    let (p, a, b, c) = (v[0], v[1], v[2], v[3]);
    t.hierarchy.insert_at(b, p, 1).unwrap();
    t.hierarchy.insert_at(a, p, 0).unwrap();
    t.hierarchy.insert_at(c, p, 5).unwrap();
    assert_eq!(t.hierarchy.children_of(p).unwrap(), vec![a, b, c]);
    assert!(t.hierarchy.children_of(c).unwrap().is_empty());
}

pub fn adjacency_insert_shifts_occupied_position(mut t: Tables) {
    let v = ids(4);
    let (p, a, b, c) = (v[0], v[1], v[2], v[3]);
    t.hierarchy.insert_at(a, p, 0).unwrap();
    t.hierarchy.insert_at(b, p, 1).unwrap();
    t.hierarchy.insert_at(c, p, 0).unwrap();
    assert_eq!(t.hierarchy.children_of(p).unwrap(), vec![c, a, b]);
}

pub fn adjacency_reinsert_moves_edge(mut t: Tables) {
    let v = ids(3);
    let (p, a, b) = (v[0], v[1], v[2]);
    t.hierarchy.insert_at(a, p, 0).unwrap();
    t.hierarchy.insert_at(b, p, 1).unwrap();
    t.hierarchy.insert_at(a, p, 2).unwrap();
    assert_eq!(t.hierarchy.children_of(p).unwrap(), vec![b, a]);
}

pub fn adjacency_parents_and_all_children(mut t: Tables) {
    let v = ids(4);
    let (p1, p2, shared, solo) = (v[0], v[1], v[2], v[3]);
    t.hierarchy.insert_at(shared, p1, 0).unwrap();
    t.hierarchy.insert_at(shared, p2, 0).unwrap();
    t.hierarchy.insert_at(solo, p1, 1).unwrap();

    assert_eq!(t.hierarchy.parents_of(shared).unwrap(), set_of(&[p1, p2]));
    assert_eq!(t.hierarchy.parents_of(solo).unwrap(), set_of(&[p1]));
    assert!(t.hierarchy.parents_of(p1).unwrap().is_empty());
    assert_eq!(t.hierarchy.all_children().unwrap(), set_of(&[shared, solo]));
}

pub fn adjacency_remove_edge(mut t: Tables) {
    let v = ids(3);
    let (p, a, b) = (v[0], v[1], v[2]);
    t.hierarchy.insert_at(a, p, 0).unwrap();
    t.hierarchy.insert_at(b, p, 1).unwrap();
    t.hierarchy.remove_edge(a, p).unwrap();
    t.hierarchy.remove_edge(a, p).unwrap();
    assert_eq!(t.hierarchy.children_of(p).unwrap(), vec![b]);
}

pub fn adjacency_purge_touches_both_positions(mut t: Tables) {
    let v = ids(4);
    let (root, mid, leaf, other) = (v[0], v[1], v[2], v[3]);
    t.hierarchy.insert_at(mid, root, 0).unwrap();
    t.hierarchy.insert_at(other, root, 1).unwrap();
    t.hierarchy.insert_at(leaf, mid, 0).unwrap();

    t.hierarchy.purge(mid).unwrap();
    assert_eq!(t.hierarchy.children_of(root).unwrap(), vec![other]);
    assert!(t.hierarchy.children_of(mid).unwrap().is_empty());
    assert!(t.hierarchy.parents_of(leaf).unwrap().is_empty());
    assert_eq!(t.hierarchy.all_children().unwrap(), set_of(&[other]));
}
