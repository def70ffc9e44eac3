//! Module: db::diff
//! Responsibility: minimal index-entry delta between two document versions.
//! Does not own: translating the delta into key mutations (see `db::index`).


use crate::{
    hash::ElementHash,
    value::{Document, FieldValue, Scalar},
};
use std::{collections::BTreeSet, fmt};

///
/// EntryRef
///
/// One index-entry identifier: a whole top-level field, or one element of an
/// array field addressed by its fan-out hash.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum EntryRef {
    Field(String),
    ArrayElement { field: String, hash: ElementHash },
}

impl EntryRef {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    #[must_use]
    pub fn element(field: impl Into<String>, element: &Scalar) -> Self {
        Self::ArrayElement {
            field: field.into(),
            hash: ElementHash::of(element),
        }
    }

    /// Top-level field this entry belongs to.
    #[must_use]
    pub fn field_name(&self) -> &str {
        match self {
            Self::Field(field) | Self::ArrayElement { field, .. } => field,
        }
    }

    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(self, Self::ArrayElement { .. })
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => f.write_str(field),
            Self::ArrayElement { field, hash } => write!(f, "{field}/array:{hash}"),
        }
    }
}

///
/// Delta
///
/// Entries to remove, entries whose field value changed, and entries to add.
/// `changes` only ever holds `EntryRef::Field`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Delta {
    pub dels: Vec<EntryRef>,
    pub changes: Vec<EntryRef>,
    pub news: Vec<EntryRef>,
}

impl Delta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dels.is_empty() && self.changes.is_empty() && self.news.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dels.len() + self.changes.len() + self.news.len()
    }

    /// Top-level fields whose index entries this delta affects.
    #[must_use]
    pub fn touched_fields(&self) -> BTreeSet<&str> {
        self.dels
            .iter()
            .chain(&self.changes)
            .chain(&self.news)
            .map(EntryRef::field_name)
            .collect()
    }

    /// Rendered `(dels, changes, news)` identifiers, for diagnostics.
    #[must_use]
    pub fn summary(&self) -> (Vec<String>, Vec<String>, Vec<String>) {
        let render = |entries: &[EntryRef]| -> Vec<String> {
            entries.iter().map(ToString::to_string).collect()
        };

        (render(&self.dels), render(&self.changes), render(&self.news))
    }
}

// Elements of an array field; scalars contribute none.
fn element_hashes(value: &FieldValue) -> Vec<ElementHash> {
    value
        .as_array()
        .unwrap_or_default()
        .iter()
        .map(ElementHash::of)
        .collect()
}

/// Compute the entry delta turning `prev` into `next`.
///
/// Fields are visited in `prev` order, then fields only present in `next`
/// in `next` order. A field whose old or new value is an array also diffs
/// its elements by hash, so moving an element inside an array produces no
/// element entries.
#[must_use]
pub fn compute_delta(prev: &Document, next: &Document) -> Delta {
    let mut delta = Delta::default();

    for (field, prev_value) in prev.iter() {
        let Some(next_value) = next.get(field) else {
            delta.dels.push(EntryRef::field(field));
            for hash in element_hashes(prev_value) {
                delta.dels.push(EntryRef::ArrayElement {
                    field: field.to_string(),
                    hash,
                });
            }
            continue;
        };

        if prev_value != next_value {
            delta.changes.push(EntryRef::field(field));
        }

        if prev_value.is_array() || next_value.is_array() {
            let old = element_hashes(prev_value);
            let new = element_hashes(next_value);
            let old_set: BTreeSet<_> = old.iter().copied().collect();
            let new_set: BTreeSet<_> = new.iter().copied().collect();

            for hash in &old {
                if !new_set.contains(hash) {
                    delta.dels.push(EntryRef::ArrayElement {
                        field: field.to_string(),
                        hash: *hash,
                    });
                }
            }
            for hash in &new {
                if !old_set.contains(hash) {
                    delta.news.push(EntryRef::ArrayElement {
                        field: field.to_string(),
                        hash: *hash,
                    });
                }
            }
        }
    }

    for (field, next_value) in next.iter() {
        if prev.contains(field) {
            continue;
        }

        delta.news.push(EntryRef::field(field));
        for hash in element_hashes(next_value) {
            delta.news.push(EntryRef::ArrayElement {
                field: field.to_string(),
                hash,
            });
        }
    }

    delta
}
