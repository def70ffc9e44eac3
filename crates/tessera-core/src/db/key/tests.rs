use super::*;
use crate::db::Direction;
use crate::{
    db::index::{IndexDef, SortSpec},
    value::{FieldValue, Scalar, canonical_cmp},
};
use proptest::prelude::*;
use std::cmp::Ordering;

fn encode(value: &FieldValue, direction: Direction) -> Vec<u8> {
    let mut out = Vec::new();
    encode_component(&mut out, value, direction);
    out
}

fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        Just(Scalar::Null),
        any::<bool>().prop_map(Scalar::Bool),
        (-1.0e12f64..1.0e12).prop_map(|v| Scalar::number(v).expect("finite")),
        prop_oneof![Just(-0.0f64), Just(0.0), Just(f64::MIN), Just(f64::MAX)]
            .prop_map(|v| Scalar::number(v).expect("finite")),
        prop::collection::vec(prop_oneof![Just('a'), Just('b'), Just('\0'), Just('\u{ff}')], 0..4)
            .prop_map(|chars| Scalar::Text(chars.into_iter().collect())),
    ]
}

fn field_value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        3 => scalar_strategy().prop_map(FieldValue::Scalar),
        1 => prop::collection::vec(scalar_strategy(), 0..4).prop_map(FieldValue::Array),
    ]
}

fn doc(fields: &[(&str, FieldValue)]) -> Document {
    Document::try_from_fields(fields.iter().cloned()).expect("valid document")
}

proptest! {
    #[test]
    fn ascending_bytes_follow_canonical_order(
        a in field_value_strategy(),
        b in field_value_strategy(),
    ) {
        let bytes = encode(&a, Direction::Asc).cmp(&encode(&b, Direction::Asc));
        prop_assert_eq!(bytes, canonical_cmp(&a, &b));
    }

    #[test]
    fn descending_bytes_reverse_canonical_order(
        a in field_value_strategy(),
        b in field_value_strategy(),
    ) {
        let bytes = encode(&a, Direction::Desc).cmp(&encode(&b, Direction::Desc));
        prop_assert_eq!(bytes, canonical_cmp(&a, &b).reverse());
    }

    #[test]
    fn tuple_keys_order_by_first_differing_component(
        a0 in field_value_strategy(),
        a1 in field_value_strategy(),
        b0 in field_value_strategy(),
        b1 in field_value_strategy(),
    ) {
        let index = IndexDef::new(
            SortSpec::try_from_pairs([("x", "asc"), ("y", "desc")]).expect("sort"),
        );
        let left = index_entry_key("c", &index, "id", &doc(&[("x", a0.clone()), ("y", a1.clone())]))
            .expect("key");
        let right = index_entry_key("c", &index, "id", &doc(&[("x", b0.clone()), ("y", b1.clone())]))
            .expect("key");

        let expected = canonical_cmp(&a0, &b0).then_with(|| canonical_cmp(&a1, &b1).reverse());
        prop_assert_eq!(left.cmp(&right), expected);
    }
}

#[test]
fn type_class_dominates_payload() {
    let ordered = [
        FieldValue::from(Scalar::Null),
        FieldValue::from(true),
        FieldValue::from(-5),
        FieldValue::from(1_000_000),
        FieldValue::from(""),
        FieldValue::from("a"),
        FieldValue::Array(vec![]),
        FieldValue::Array(vec![Scalar::from(1)]),
    ];

    for pair in ordered.windows(2) {
        assert_eq!(
            encode(&pair[0], Direction::Asc).cmp(&encode(&pair[1], Direction::Asc)),
            Ordering::Less,
            "{:?} should sort before {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn embedded_nul_text_stays_prefix_free() {
    let short = FieldValue::from("a");
    let nul = FieldValue::from("a\u{0}");

    assert!(encode(&short, Direction::Asc) < encode(&nul, Direction::Asc));
    assert!(encode(&short, Direction::Desc) > encode(&nul, Direction::Desc));
}

#[test]
fn id_tiebreak_stays_ascending_under_descending_sort() {
    let index = IndexDef::new(SortSpec::try_from_pairs([("age", "desc")]).expect("sort"));
    let age = doc(&[("age", FieldValue::from(5))]);

    let a = index_entry_key("ppl", &index, "Alice", &age).expect("key");
    let b = index_entry_key("ppl", &index, "Beth", &age).expect("key");

    assert!(a < b);
}

#[test]
fn missing_sort_field_yields_no_entry() {
    let index = IndexDef::new(SortSpec::try_from_pairs([("age", "asc"), ("name", "asc")]).expect("sort"));

    assert!(index_entry_key("ppl", &index, "Bob", &doc(&[("age", FieldValue::from(3))])).is_none());
}

#[test]
fn collection_prefixes_do_not_nest() {
    // "a" must not be a byte prefix of "ab" once terminated.
    let a = document_prefix("a");
    let ab = document_key("ab", "x");

    assert!(!ab.starts_with(a.as_bytes()));
}

#[test]
fn prefix_successor_skips_trailing_max_bytes() {
    assert_eq!(prefix_successor(&[1, 2, 3]), Some(vec![1, 2, 4]));
    assert_eq!(prefix_successor(&[1, 0xFF, 0xFF]), Some(vec![2]));
    assert_eq!(prefix_successor(&[0xFF]), None);
    assert_eq!(prefix_successor(&[]), None);
}

#[test]
fn fanout_keys_group_by_field_and_element() {
    let hash = ElementHash::of(&Scalar::from("apple"));
    let prefix = fanout_prefix("ppl", "favs", &hash);
    let key = fanout_key("ppl", "favs", &hash, "Bob");

    assert!(key.starts_with(prefix.as_bytes()));
    assert!(!fanout_key("ppl", "fav", &hash, "Bob").starts_with(prefix.as_bytes()));
}

#[test]
fn envelope_emptiness_respects_bound_kinds() {
    let a = vec![1u8];
    let b = vec![2u8];

    assert!(!envelope_is_empty(&Bound::Included(a.clone()), &Bound::Excluded(b.clone())));
    assert!(envelope_is_empty(&Bound::Included(b.clone()), &Bound::Excluded(a.clone())));
    assert!(!envelope_is_empty(&Bound::Included(a.clone()), &Bound::Included(a.clone())));
    assert!(envelope_is_empty(&Bound::Included(a.clone()), &Bound::Excluded(a.clone())));
    assert!(!envelope_is_empty(&Bound::Unbounded, &Bound::Excluded(a)));
    assert!(!KeyBounds::prefix(&b).is_empty());
}
