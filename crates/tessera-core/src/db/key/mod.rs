//! Module: db::key
//! Responsibility: physical key layout for documents, index entries, fan-out
//! entries and the per-collection index catalog.
//! Does not own: index registration or scan execution.
//!
//! Every key starts with a one-byte keyspace tag followed by the terminated
//! collection path, so one collection's keys never interleave with another's
//! within a keyspace.

mod ordered;

#[cfg(test)]
mod tests;

pub(crate) use ordered::{encode_component, push_terminated_bytes};

use crate::{
    db::index::IndexDef,
    hash::ElementHash,
    value::Document,
};
use derive_more::Deref;
use std::ops::Bound;

///
/// KeySpace
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub(crate) enum KeySpace {
    Catalog = 0x01,
    Document = 0x02,
    Index = 0x03,
    Fanout = 0x04,
}

impl KeySpace {
    pub(crate) const ALL: [Self; 4] = [Self::Catalog, Self::Document, Self::Index, Self::Fanout];

    const fn to_u8(self) -> u8 {
        self as u8
    }
}

///
/// RawKey
///
/// Fully encoded backend key.
///

#[derive(Clone, Debug, Deref, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct RawKey(Vec<u8>);

impl RawKey {
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn collection_prefix(space: KeySpace, path: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(path.len() + 3);
    out.push(space.to_u8());
    push_terminated_bytes(&mut out, path.as_bytes());

    out
}

/// Every key belonging to `path` within one keyspace shares this prefix.
pub(crate) fn keyspace_prefix(space: KeySpace, path: &str) -> RawKey {
    RawKey(collection_prefix(space, path))
}

pub(crate) fn catalog_key(path: &str) -> RawKey {
    RawKey(collection_prefix(KeySpace::Catalog, path))
}

pub(crate) fn document_prefix(path: &str) -> RawKey {
    keyspace_prefix(KeySpace::Document, path)
}

pub(crate) fn document_key(path: &str, id: &str) -> RawKey {
    let mut out = collection_prefix(KeySpace::Document, path);
    push_terminated_bytes(&mut out, id.as_bytes());

    RawKey(out)
}

/// Prefix shared by every entry of one index.
pub(crate) fn index_prefix(path: &str, index: &IndexDef) -> RawKey {
    let mut out = collection_prefix(KeySpace::Index, path);
    out.extend_from_slice(index.id().as_bytes());

    RawKey(out)
}

/// Composite index entry for `doc`, or `None` when any sort field is absent.
///
/// Layout: index prefix, one component per sort field (inverted when
/// descending), then the ascending terminated document id as tiebreak.
pub(crate) fn index_entry_key(
    path: &str,
    index: &IndexDef,
    id: &str,
    doc: &Document,
) -> Option<RawKey> {
    let mut out = index_prefix(path, index).into_bytes();
    for field in index.sort().fields() {
        let value = doc.get(field.name())?;
        encode_component(&mut out, value, field.direction());
    }
    push_terminated_bytes(&mut out, id.as_bytes());

    Some(RawKey(out))
}

/// Prefix shared by every document holding `element` in array `field`.
pub(crate) fn fanout_prefix(path: &str, field: &str, hash: &ElementHash) -> RawKey {
    let mut out = collection_prefix(KeySpace::Fanout, path);
    push_terminated_bytes(&mut out, field.as_bytes());
    out.extend_from_slice(hash.as_bytes());

    RawKey(out)
}

pub(crate) fn fanout_key(path: &str, field: &str, hash: &ElementHash, id: &str) -> RawKey {
    let mut out = fanout_prefix(path, field, hash).into_bytes();
    push_terminated_bytes(&mut out, id.as_bytes());

    RawKey(out)
}

/// Smallest byte string greater than every string prefixed by `prefix`.
///
/// Returns `None` when no such string exists (empty or all-`0xFF` input).
pub(crate) fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut out = prefix.to_vec();
    while let Some(last) = out.pop() {
        if last != u8::MAX {
            out.push(last + 1);
            return Some(out);
        }
    }

    None
}

///
/// KeyBounds
///
/// Half-open byte envelope handed to a backend scan.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct KeyBounds {
    pub(crate) lower: Bound<Vec<u8>>,
    pub(crate) upper: Bound<Vec<u8>>,
}

impl KeyBounds {
    /// Every key starting with `prefix`.
    pub(crate) fn prefix(prefix: &[u8]) -> Self {
        Self {
            lower: Bound::Included(prefix.to_vec()),
            upper: prefix_successor(prefix).map_or(Bound::Unbounded, Bound::Excluded),
        }
    }

    /// True when no key can satisfy both bounds.
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        envelope_is_empty(&self.lower, &self.upper)
    }
}

///
/// Validate whether raw key bounds encode an empty traversal envelope.
///

#[must_use]
pub(crate) fn envelope_is_empty(lower: &Bound<Vec<u8>>, upper: &Bound<Vec<u8>>) -> bool {
    // Unbounded envelopes are never empty by construction.
    let (Some(lower_key), Some(upper_key)) = (bound_key_ref(lower), bound_key_ref(upper)) else {
        return false;
    };

    if lower_key < upper_key {
        return false;
    }
    if lower_key > upper_key {
        return true;
    }

    !matches!(lower, Bound::Included(_)) || !matches!(upper, Bound::Included(_))
}

const fn bound_key_ref(bound: &Bound<Vec<u8>>) -> Option<&Vec<u8>> {
    match bound {
        Bound::Included(value) | Bound::Excluded(value) => Some(value),
        Bound::Unbounded => None,
    }
}
