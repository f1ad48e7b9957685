//! Structural invariants over random operation sequences.

use arbor_core::{MetadataError, MetadataStore};
use arbor_model::EntityMetadata;
use arbor_types::{EntityId, EntityKind, KindFilter};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Add(EntityKind),
    /// Indexes are taken modulo the number of live entities.
    Attach { child: usize, parent: usize, order: u32 },
    Detach { child: usize, parent: usize },
    Remove(usize),
    Copy(usize),
    Tag { entity: usize, value: u8 },
}

fn arb_kind() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(EntityKind::ALL.to_vec())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => arb_kind().prop_map(Op::Add),
        4 => (any::<usize>(), any::<usize>(), 0u32..4)
            .prop_map(|(child, parent, order)| Op::Attach { child, parent, order }),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(child, parent)| Op::Detach { child, parent }),
        1 => any::<usize>().prop_map(Op::Remove),
        1 => any::<usize>().prop_map(Op::Copy),
        1 => (any::<usize>(), 0u8..3).prop_map(|(entity, value)| Op::Tag { entity, value }),
    ]
}

fn live_ids(store: &MetadataStore) -> Vec<EntityId> {
    let mut ids: Vec<_> = store
        .get_entity_ids_by_metadata(None, KindFilter::Any)
        .unwrap()
        .into_iter()
        .collect();
    ids.sort();
    ids
}

fn apply(store: &MetadataStore, op: &Op) {
    let ids = live_ids(store);
    let pick = |i: usize| ids[i % ids.len()];
    let result = match *op {
        Op::Add(kind) => store.add_entity(kind, None).map(drop),
        _ if ids.is_empty() => Ok(()),
        Op::Attach { child, parent, order } => {
            store.add_child(pick(child), pick(parent), order).map(drop)
        }
        Op::Detach { child, parent } => store.remove_child(pick(child), pick(parent)),
        Op::Remove(i) => store.remove_entity(pick(i)),
        Op::Copy(i) => store.copy_entity(pick(i)).map(drop),
        Op::Tag { entity, value } => store.update_entity(
            pick(entity),
            &EntityMetadata::new().with_public("tag", value.to_string()),
        ),
    };
    match result {
        Ok(()) | Err(MetadataError::InvalidOperation(_)) => {}
        Err(e) => panic!("{op:?} failed: {e}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn only_columns_have_several_parents(ops in prop::collection::vec(arb_op(), 1..60)) {
        let store = MetadataStore::in_memory().unwrap();
        for op in &ops {
            apply(&store, op);
            for entity in store.get_entities_by_id(&live_ids(&store)).unwrap() {
                if entity.kind != Some(EntityKind::Column) {
                    let parents = store.get_parent_ids(entity.id).unwrap();
                    prop_assert!(parents.len() <= 1, "{} has parents {:?}", entity.id, parents);
                }
            }
        }
    }

    #[test]
    fn root_is_everything_that_is_nobodys_child(ops in prop::collection::vec(arb_op(), 1..60)) {
        let store = MetadataStore::in_memory().unwrap();
        for op in &ops {
            apply(&store, op);
        }
        let ids = live_ids(&store);
        let mut children = HashSet::new();
        for id in &ids {
            children.extend(store.get_child_ids(Some(*id)).unwrap());
        }
        let expected: Vec<_> = ids.iter().copied().filter(|id| !children.contains(id)).collect();
        prop_assert_eq!(store.get_child_ids(None).unwrap(), expected);
    }

    #[test]
    fn removed_tables_leave_nothing_behind(ops in prop::collection::vec(arb_op(), 1..40)) {
        let store = MetadataStore::in_memory().unwrap();
        for op in &ops {
            apply(&store, op);
        }
        let tables = store
            .get_entity_ids_by_metadata(None, KindFilter::Only(EntityKind::DataTable))
            .unwrap();
        for table in tables {
            if store.get_entity(table).unwrap().is_none() {
                continue;
            }
            let mut subtree = vec![table];
            let mut stack = vec![table];
            let mut seen = HashSet::new();
            while let Some(id) = stack.pop() {
                if seen.insert(id) {
                    let kids = store.get_child_ids(Some(id)).unwrap();
                    subtree.extend(kids.iter().copied());
                    stack.extend(kids);
                }
            }

            store.remove_entity(table).unwrap();

            for id in subtree {
                prop_assert!(store.get_entity(id).unwrap().is_none());
                prop_assert!(store.get_parent_ids(id).unwrap().is_empty());
                prop_assert!(store.get_child_ids(Some(id)).unwrap().is_empty());
            }
        }
    }
}
