use super::*;
use serde_json::json;
use std::cmp::Ordering;

fn num(v: f64) -> Scalar {
    Scalar::number(v).expect("finite")
}

#[test]
fn cross_type_order_is_type_class_first() {
    let ordered = [
        Scalar::Null,
        Scalar::Bool(false),
        Scalar::Bool(true),
        num(-1.5),
        num(0.0),
        num(1e300),
        Scalar::from(""),
        Scalar::from("B"),
        Scalar::from("a"),
    ];

    for pair in ordered.windows(2) {
        assert_eq!(canonical_cmp_scalar(&pair[0], &pair[1]), Ordering::Less);
    }
    assert_eq!(
        canonical_cmp(&FieldValue::from("zzz"), &FieldValue::Array(vec![])),
        Ordering::Less
    );
}

#[test]
fn arrays_compare_element_wise_shorter_first() {
    let short = FieldValue::Array(vec![Scalar::from(1)]);
    let long = FieldValue::Array(vec![Scalar::from(1), Scalar::Null]);
    let bigger = FieldValue::Array(vec![Scalar::from(2)]);

    assert_eq!(canonical_cmp(&short, &long), Ordering::Less);
    assert_eq!(canonical_cmp(&long, &bigger), Ordering::Less);
    assert_eq!(canonical_cmp(&short, &short.clone()), Ordering::Equal);
}

#[test]
fn negative_zero_folds_and_non_finite_is_rejected() {
    assert_eq!(num(-0.0), num(0.0));
    assert_eq!(num(-0.0).to_js_string(), "0");
    assert!(matches!(Number::new(f64::NAN), Err(ValueError::NonFiniteNumber(_))));
    assert!(Number::new(f64::INFINITY).is_err());
}

#[test]
fn js_string_form_matches_reference_runtime() {
    let cases = [
        (1.0, "1"),
        (-3.0, "-3"),
        (1.5, "1.5"),
        (0.1, "0.1"),
        (123_456_789.0, "123456789"),
        (1e21, "1e+21"),
        (1.5e-7, "1.5e-7"),
        (1e-7, "1e-7"),
        (1e-6, "0.000001"),
    ];

    for (value, expected) in cases {
        assert_eq!(num(value).to_js_string(), expected, "rendering {value}");
    }
    assert_eq!(Scalar::Null.to_js_string(), "null");
    assert_eq!(Scalar::Bool(true).to_js_string(), "true");
    assert_eq!(Scalar::from("apple").to_js_string(), "apple");
}

#[test]
fn json_round_trip_keeps_field_order() {
    let source = json!({"name": "Bob", "age": 3, "favs": ["apple", 1.5, null, true]});

    let doc = Document::from_json(&source).expect("valid document");

    assert_eq!(doc.field_names().collect::<Vec<_>>(), vec!["name", "age", "favs"]);
    assert_eq!(doc.to_json(), source);
}

#[test]
fn json_rejects_unrepresentable_shapes() {
    assert!(matches!(
        Document::from_json(&json!({"a": {"b": 1}})),
        Err(ValueError::NestedObject { field }) if field == "a"
    ));
    assert!(matches!(
        Document::from_json(&json!({"a": [[1]]})),
        Err(ValueError::NestedArray { field }) if field == "a"
    ));
    assert!(matches!(
        Document::from_json(&json!([1, 2])),
        Err(ValueError::NotAnObject { found: "array" })
    ));
}

#[test]
fn document_equality_ignores_field_order() {
    let a = Document::from_json(&json!({"x": 1, "y": 2})).expect("doc");
    let b = Document::from_json(&json!({"y": 2, "x": 1})).expect("doc");
    let c = Document::from_json(&json!({"x": 1})).expect("doc");

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn document_insert_replaces_in_place_and_rejects_bad_names() {
    let mut doc = Document::try_from_fields([("a", 1), ("b", 2)]).expect("doc");

    let old = doc.insert("a", 9).expect("insert");
    assert_eq!(old, Some(FieldValue::from(1)));
    assert_eq!(doc.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert!(matches!(doc.insert("", 1), Err(ValueError::EmptyFieldName)));
    assert!(matches!(
        Document::try_from_fields([("a", 1), ("a", 2)]),
        Err(ValueError::DuplicateField(name)) if name == "a"
    ));
    assert_eq!(doc.remove("a"), Some(FieldValue::from(9)));
    assert_eq!(doc.len(), 1);
}
