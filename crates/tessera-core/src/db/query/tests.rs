use super::*;
use crate::db::{
    Direction,
    index::{IndexDef, SortSpec},
    key::{document_prefix, index_prefix},
};
use serde_json::json;
use std::ops::Bound;

fn cursor(value: serde_json::Value) -> Document {
    Document::from_json(&value).expect("valid cursor")
}

fn index(pairs: &[(&str, &str)]) -> Access {
    Access::Index(IndexDef::new(
        SortSpec::try_from_pairs(pairs.iter().copied()).expect("valid sort"),
    ))
}

#[test]
fn options_parse_from_wire_form() {
    let options = RangeOptions::from_json(&json!({
        "reverse": true,
        "limit": 2,
        "startAfter": {"name": "Bob"},
        "endBefore": {"name": "Alice"},
    }))
    .expect("parse");

    assert_eq!(
        options,
        RangeOptions::new()
            .reverse()
            .limit(2)
            .start_after(cursor(json!({"name": "Bob"})))
            .end_before(cursor(json!({"name": "Alice"})))
    );
    assert!(options.has_cursor());
    assert!(RangeOptions::from_json(&json!({"skip": 1})).is_err());
    assert!(RangeOptions::from_json(&json!({"limit": -1})).is_err());
}

#[test]
fn no_cursor_scans_whole_index_prefix() {
    let access = index(&[("age", "asc")]);
    let Access::Index(def) = &access else { unreachable!() };

    let (bounds, direction) = range_bounds("ppl", &access, &RangeOptions::new()).expect("bounds");

    assert_eq!(bounds.lower, Bound::Included(index_prefix("ppl", def).into_bytes()));
    assert_eq!(direction, Direction::Asc);
}

#[test]
fn primary_descending_flips_iteration() {
    let access = Access::Primary { descending: true };

    let (_, direction) = range_bounds("ppl", &access, &RangeOptions::new()).expect("bounds");
    assert_eq!(direction, Direction::Desc);

    let (_, direction) = range_bounds("ppl", &access, &RangeOptions::new().reverse()).expect("bounds");
    assert_eq!(direction, Direction::Asc);
}

#[test]
fn reverse_start_cursor_bounds_the_upper_end() {
    let access = index(&[("age", "asc")]);
    let options = RangeOptions::new().reverse().start_at(cursor(json!({"age": 3})));

    let (bounds, direction) = range_bounds("ppl", &access, &options).expect("bounds");

    assert_eq!(direction, Direction::Desc);
    assert!(matches!(bounds.lower, Bound::Included(_)));
    assert!(matches!(bounds.upper, Bound::Excluded(_)));
    assert!(!bounds.is_empty());
}

#[test]
fn crossing_cursors_produce_an_empty_envelope() {
    let access = index(&[("age", "asc")]);
    let options = RangeOptions::new()
        .start_at(cursor(json!({"age": 9})))
        .end_at(cursor(json!({"age": 1})));

    let (bounds, _) = range_bounds("ppl", &access, &options).expect("bounds");

    assert!(bounds.is_empty());
}

#[test]
fn cursor_must_be_a_sort_prefix() {
    let access = index(&[("age", "asc"), ("name", "asc")]);

    let err = range_bounds(
        "ppl",
        &access,
        &RangeOptions::new().start_at(cursor(json!({"name": "Bob"}))),
    )
    .expect_err("gap");
    assert!(matches!(err, CursorError::NotAPrefix { missing } if missing == "age"));

    let err = range_bounds(
        "ppl",
        &access,
        &RangeOptions::new().start_at(cursor(json!({"height": 1}))),
    )
    .expect_err("unknown field");
    assert!(matches!(err, CursorError::UnknownField { .. }));

    let err = range_bounds(
        "ppl",
        &access,
        &RangeOptions::new().start_at(cursor(json!({"age": 3, "__id__": "Bob"}))),
    )
    .expect_err("partial tuple with id");
    assert!(matches!(err, CursorError::IdWithoutFullTuple));
}

#[test]
fn conflicting_cursors_are_rejected() {
    let access = index(&[("age", "asc")]);
    let options = RangeOptions::new()
        .start_at(cursor(json!({"age": 1})))
        .start_after(cursor(json!({"age": 2})));

    assert!(matches!(
        range_bounds("ppl", &access, &options),
        Err(CursorError::Conflicting(_))
    ));
}

#[test]
fn primary_cursor_accepts_only_id() {
    let access = Access::Primary { descending: false };

    let (bounds, _) = range_bounds(
        "ppl",
        &access,
        &RangeOptions::new().start_after(cursor(json!({"__id__": "Beth"}))),
    )
    .expect("bounds");
    assert_ne!(bounds.lower, Bound::Included(document_prefix("ppl").into_bytes()));

    assert!(matches!(
        range_bounds(
            "ppl",
            &access,
            &RangeOptions::new().start_at(cursor(json!({"age": 3}))),
        ),
        Err(CursorError::UnknownField { .. })
    ));
    assert!(matches!(
        range_bounds(
            "ppl",
            &access,
            &RangeOptions::new().start_at(cursor(json!({"__id__": 3}))),
        ),
        Err(CursorError::IdNotText)
    ));
}
