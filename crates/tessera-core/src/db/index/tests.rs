use super::*;
use crate::db::{
    Direction,
    backend::{Backend, BatchOp, MemoryBackend, WriteBatch},
    diff::compute_delta,
    key::{document_key, index_entry_key},
};
use crate::value::Document;
use serde_json::json;

fn doc(value: serde_json::Value) -> Document {
    Document::from_json(&value).expect("valid document")
}

fn sort(pairs: &[(&str, &str)]) -> SortSpec {
    SortSpec::try_from_pairs(pairs.iter().copied()).expect("valid sort")
}

#[test]
fn sort_validation_rejects_malformed_descriptors() {
    assert!(matches!(
        SortSpec::try_from_pairs([("age", "up")]),
        Err(SortError::UnknownDirection { .. })
    ));
    assert!(matches!(
        SortSpec::try_from_pairs([("age", "asc"), ("age", "desc")]),
        Err(SortError::DuplicateField(field)) if field == "age"
    ));
    assert!(matches!(
        SortSpec::try_from_pairs(Vec::<(&str, &str)>::new()),
        Err(SortError::Empty)
    ));
    assert!(matches!(
        SortSpec::try_from_pairs([("__id__", "asc"), ("age", "asc")]),
        Err(SortError::ReservedIdField)
    ));
    assert!(matches!(
        sort(&[("a", "asc"), ("b", "asc"), ("c", "asc")]).validate_width(2),
        Err(SortError::TooManyFields { found: 3, max: 2 })
    ));
}

#[test]
fn sort_json_form_defaults_to_ascending() {
    let parsed = SortSpec::from_json(&json!([["age", "desc"], ["name"]])).expect("parse");

    assert_eq!(parsed, sort(&[("age", "desc"), ("name", "asc")]));
    assert_eq!(parsed.to_json(), json!([["age", "desc"], ["name", "asc"]]));
    assert_eq!(parsed.to_string(), "age:desc,name:asc");
    assert!(SortSpec::from_json(&json!({"age": "asc"})).is_err());
    assert!(SortSpec::from_json(&json!([["age", 1]])).is_err());
}

#[test]
fn primary_descriptor_is_recognised() {
    assert_eq!(SortSpec::primary(Direction::Desc).primary_direction(), Some(Direction::Desc));
    assert_eq!(sort(&[("age", "asc")]).primary_direction(), None);
}

#[test]
fn index_id_depends_on_direction_and_order() {
    let a = IndexId::of(&sort(&[("age", "asc"), ("name", "asc")]));
    let b = IndexId::of(&sort(&[("age", "desc"), ("name", "asc")]));
    let c = IndexId::of(&sort(&[("name", "asc"), ("age", "asc")]));

    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, IndexId::of(&sort(&[("age", "asc"), ("name", "asc")])));
}

#[test]
fn catalog_round_trips_through_backend() {
    let mut backend = MemoryBackend::new();
    let mut catalog = IndexCatalog::default();
    assert!(catalog.insert(IndexDef::new(sort(&[("age", "desc"), ("name", "desc")]))));
    assert!(!catalog.insert(IndexDef::new(sort(&[("age", "desc"), ("name", "desc")]))));

    let mut batch = WriteBatch::new();
    catalog.stage("ppl", &mut batch).expect("stage");
    backend.commit(batch).expect("commit");

    let loaded = IndexCatalog::load(&backend, "ppl").expect("load");
    assert_eq!(loaded, catalog);
    assert_eq!(IndexCatalog::load(&backend, "other").expect("load"), IndexCatalog::default());

    let mut emptied = loaded;
    assert!(emptied.remove(&sort(&[("age", "desc"), ("name", "desc")])).is_some());
    let mut batch = WriteBatch::new();
    emptied.stage("ppl", &mut batch).expect("stage");
    assert!(matches!(batch.ops(), [BatchOp::Delete { .. }]));
}

#[test]
fn resolve_index_prefers_implicit_single_field() {
    let catalog = IndexCatalog::default();

    assert!(resolve_index(&catalog, &sort(&[("age", "asc")]), true).is_some());
    assert!(resolve_index(&catalog, &sort(&[("age", "asc")]), false).is_none());
    assert!(resolve_index(&catalog, &sort(&[("age", "asc"), ("name", "asc")]), true).is_none());
}

#[test]
fn unchanged_composite_value_plans_nothing() {
    let mut catalog = IndexCatalog::default();
    catalog.insert(IndexDef::new(sort(&[("age", "asc"), ("name", "asc")])));
    let prev = doc(json!({"name": "Bob", "age": 3, "note": "a"}));
    let next = doc(json!({"name": "Bob", "age": 3, "note": "b"}));
    let delta = compute_delta(&prev, &next);

    let mut batch = WriteBatch::new();
    let counts = IndexMutation {
        path: "ppl",
        id: "Bob",
        catalog: &catalog,
        auto_field_indexes: false,
        prev: &prev,
        next: &next,
    }
    .plan(&delta, &mut batch);

    assert_eq!(counts, IndexMutationCounts::default());
    assert!(batch.is_empty());
}

#[test]
fn changed_composite_value_rewrites_key() {
    let def = IndexDef::new(sort(&[("age", "asc"), ("name", "asc")]));
    let mut catalog = IndexCatalog::default();
    catalog.insert(def.clone());
    let prev = doc(json!({"name": "Bob", "age": 3}));
    let next = doc(json!({"name": "Bob", "age": 4}));
    let delta = compute_delta(&prev, &next);

    let mut batch = WriteBatch::new();
    let counts = IndexMutation {
        path: "ppl",
        id: "Bob",
        catalog: &catalog,
        auto_field_indexes: false,
        prev: &prev,
        next: &next,
    }
    .plan(&delta, &mut batch);

    let old = index_entry_key("ppl", &def, "Bob", &prev).expect("key").into_bytes();
    let new = index_entry_key("ppl", &def, "Bob", &next).expect("key").into_bytes();
    assert_eq!(
        batch.ops(),
        &[
            BatchOp::Delete { key: old },
            BatchOp::Put {
                key: new,
                value: b"Bob".to_vec()
            },
        ]
    );
    assert_eq!(counts.index_inserts, 1);
    assert_eq!(counts.index_removes, 1);
}

#[test]
fn implicit_indexes_cover_both_directions_and_fanout() {
    let catalog = IndexCatalog::default();
    let prev = Document::new();
    let next = doc(json!({"favs": ["apple", "grapes"]}));
    let delta = compute_delta(&prev, &next);

    let mut batch = WriteBatch::new();
    let counts = IndexMutation {
        path: "ppl",
        id: "Bob",
        catalog: &catalog,
        auto_field_indexes: true,
        prev: &prev,
        next: &next,
    }
    .plan(&delta, &mut batch);

    assert_eq!(counts.index_inserts, 2);
    assert_eq!(counts.fanout_inserts, 2);
    assert_eq!(batch.len(), 4);
}

#[test]
fn backfill_and_teardown_cover_every_document() {
    let mut backend = MemoryBackend::new();
    let mut batch = WriteBatch::new();
    for (id, age) in [("Bob", 3), ("Beth", 5)] {
        let row = crate::db::data::StoredRow::new(id.to_string(), doc(json!({"age": age, "favs": ["x"]})));
        batch.put(document_key("ppl", id).into_bytes(), row.encode(1024).expect("encode"));
    }
    let untouched = crate::db::data::StoredRow::new("Zed".to_string(), doc(json!({"name": "Zed"})));
    batch.put(document_key("ppl", "Zed").into_bytes(), untouched.encode(1024).expect("encode"));
    backend.commit(batch).expect("commit");

    let def = IndexDef::new(sort(&[("age", "desc"), ("favs", "asc")]));
    let mut batch = WriteBatch::new();
    let report = plan_backfill(&backend, "ppl", &def, 1024, &mut batch).expect("backfill");
    assert_eq!(report.rows, 3);
    assert_eq!(report.index_entries, 2);
    assert_eq!(report.fanout_entries, 2);
    backend.commit(batch).expect("commit");

    let mut batch = WriteBatch::new();
    let removed = plan_teardown(&backend, "ppl", &def, &mut batch).expect("teardown");
    assert_eq!(removed, 2);
}
