use crate::value::{FieldValue, Scalar};
use std::cmp::Ordering;

/// Total canonical comparator over field values.
///
/// Ordering rules:
/// 1. Canonical variant rank (`null < bool < number < text < array`)
/// 2. Variant-specific comparison for same-ranked values
///
/// The byte encoding in `db::key` must agree with this function exactly.
#[must_use]
pub fn canonical_cmp(left: &FieldValue, right: &FieldValue) -> Ordering {
    match (left, right) {
        (FieldValue::Scalar(a), FieldValue::Scalar(b)) => canonical_cmp_scalar(a, b),
        (FieldValue::Array(a), FieldValue::Array(b)) => canonical_cmp_list(a, b),
        _ => left.tag().rank().cmp(&right.tag().rank()),
    }
}

/// Total canonical comparator over scalars.
#[must_use]
pub fn canonical_cmp_scalar(left: &Scalar, right: &Scalar) -> Ordering {
    let rank = left.tag().rank().cmp(&right.tag().rank());
    if rank != Ordering::Equal {
        return rank;
    }

    match (left, right) {
        (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
        (Scalar::Number(a), Scalar::Number(b)) => a.cmp(b),
        (Scalar::Text(a), Scalar::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
        _ => Ordering::Equal,
    }
}

// Element-wise, shorter prefix first.
fn canonical_cmp_list(left: &[Scalar], right: &[Scalar]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp_scalar(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}
