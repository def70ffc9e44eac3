use crate::{
    db::Direction,
    value::{FieldValue, Number, Scalar},
};

/// Terminates an array component; element tags are never zero.
const ARRAY_TERMINATOR: u8 = 0x00;

/// Encode one field value so lexicographic byte order matches
/// `canonical_cmp`, inverted for descending components.
///
/// Every encoding is prefix-free, so components can be concatenated into a
/// tuple key and inversion exactly reverses their relative order.
pub(crate) fn encode_component(out: &mut Vec<u8>, value: &FieldValue, direction: Direction) {
    let start = out.len();
    encode_field_value(out, value);

    if direction == Direction::Desc {
        for byte in &mut out[start..] {
            *byte = !*byte;
        }
    }
}

/// Encode a field value in ascending canonical order.
fn encode_field_value(out: &mut Vec<u8>, value: &FieldValue) {
    match value {
        FieldValue::Scalar(scalar) => encode_scalar(out, scalar),
        FieldValue::Array(items) => {
            out.push(value.tag().to_u8());
            for item in items {
                encode_scalar(out, item);
            }
            out.push(ARRAY_TERMINATOR);
        }
    }
}

/// Encode one scalar: canonical tag followed by an order-preserving payload.
fn encode_scalar(out: &mut Vec<u8>, value: &Scalar) {
    out.push(value.tag().to_u8());

    match value {
        Scalar::Null => {}
        Scalar::Bool(v) => out.push(u8::from(*v)),
        Scalar::Number(v) => out.extend_from_slice(&ordered_f64_bytes(*v)),
        Scalar::Text(v) => push_terminated_bytes(out, v.as_bytes()),
    }
}

// Byte strings are escaped so tuple boundaries remain unambiguous.
pub(crate) fn push_terminated_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    for &byte in bytes {
        if byte == 0 {
            out.extend_from_slice(&[0, 0xFF]);
        } else {
            out.push(byte);
        }
    }

    out.extend_from_slice(&[0, 0]);
}

// Sign-magnitude to two's-complement-like ordering: flip all bits of
// negatives, flip only the sign bit of positives.
const fn ordered_f64_bytes(value: Number) -> [u8; 8] {
    let bits = value.get().to_bits();
    let ordered = if bits >> 63 == 1 { !bits } else { bits ^ (1u64 << 63) };

    ordered.to_be_bytes()
}
