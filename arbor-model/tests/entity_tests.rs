use arbor_model::{AttributeMap, Entity, EntityMetadata, EntityWithChildren, filter_entities};
use arbor_types::{EntityId, EntityKind, KindFilter};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;

fn make_entity(id: i64, kind: Option<EntityKind>, title: &str) -> Entity {
    Entity::new(
        EntityId::new(id),
        kind,
        EntityMetadata::new()
            .with_public("title", title)
            .with_private("connection", "warehouse"),
    )
}

fn criteria(pairs: &[(&str, &str)]) -> AttributeMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ── Construction & accessors ─────────────────────────────────────

#[test]
fn entity_accessors() {
    let e = make_entity(1, Some(EntityKind::Column), "Population");
    assert!(e.exists());
    assert_eq!(e.public_value("title"), Some("Population"));
    assert_eq!(e.private_value("connection"), Some("warehouse"));
    assert_eq!(e.public_value("missing"), None);
}

#[test]
fn entity_without_kind_does_not_exist() {
    let e = Entity::new(EntityId::new(9), None, EntityMetadata::new());
    assert!(!e.exists());
}

#[test]
fn without_private_drops_private_namespace() {
    let e = make_entity(1, Some(EntityKind::Column), "Population").without_private();
    assert!(e.private_metadata().is_empty());
    assert_eq!(e.public_value("title"), Some("Population"));
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn entity_serializes_with_type_code_and_namespaces() {
    let e = make_entity(4, Some(EntityKind::DataTable), "Counties");
    let value = serde_json::to_value(&e).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 4,
            "type": 1,
            "publicMetadata": {"title": "Counties"},
            "privateMetadata": {"connection": "warehouse"},
        })
    );
}

#[test]
fn entity_deserializes_missing_namespaces_as_empty() {
    let e: Entity = serde_json::from_value(json!({"id": 2, "type": 3})).unwrap();
    assert_eq!(e.id, EntityId::new(2));
    assert_eq!(e.kind, Some(EntityKind::Column));
    assert!(e.metadata.is_empty());
}

#[test]
fn entity_with_children_serializes_child_ids() {
    let e = make_entity(4, Some(EntityKind::Category), "Group");
    let with_children = EntityWithChildren::new(e, vec![EntityId::new(7), EntityId::new(5)]);
    let value = serde_json::to_value(&with_children).unwrap();
    assert_eq!(value["childIds"], json!([7, 5]));
    assert_eq!(value["type"], json!(2));
}

// ── filter_entities ──────────────────────────────────────────────

#[test]
fn filter_matches_on_content_equality() {
    let entities = vec![
        make_entity(1, Some(EntityKind::Column), "A"),
        make_entity(2, Some(EntityKind::Column), "B"),
    ];
    // A value built at runtime must still compare equal to the stored one.
    let wanted = String::from_utf8(b"B".to_vec()).unwrap();
    let mut c = AttributeMap::new();
    c.insert("title".to_string(), wanted);

    let found = filter_entities(&entities, &c, KindFilter::Any);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, EntityId::new(2));
}

#[test]
fn filter_requires_every_pair() {
    let mut e = make_entity(1, Some(EntityKind::Column), "A");
    e.metadata.public.insert("dataType".into(), "number".into());
    let entities = vec![e];

    assert_eq!(
        filter_entities(&entities, &criteria(&[("title", "A"), ("dataType", "number")]), KindFilter::Any).len(),
        1
    );
    assert!(filter_entities(&entities, &criteria(&[("title", "A"), ("dataType", "string")]), KindFilter::Any).is_empty());
}

#[test]
fn filter_applies_kind() {
    let entities = vec![
        make_entity(1, Some(EntityKind::Column), "A"),
        make_entity(2, Some(EntityKind::Category), "A"),
        make_entity(3, None, "A"),
    ];
    let found = filter_entities(&entities, &criteria(&[("title", "A")]), EntityKind::Category.into());
    assert_eq!(found.iter().map(|e| e.id.get()).collect::<Vec<_>>(), vec![2]);

    let all = filter_entities(&entities, &criteria(&[("title", "A")]), KindFilter::Any);
    assert_eq!(all.len(), 3);
}

#[test]
fn filter_with_empty_criteria_keeps_everything_of_kind() {
    let entities = vec![
        make_entity(1, Some(EntityKind::Column), "A"),
        make_entity(2, Some(EntityKind::Category), "B"),
    ];
    assert_eq!(filter_entities(&entities, &HashMap::new(), KindFilter::Any).len(), 2);
}
