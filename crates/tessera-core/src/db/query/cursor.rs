use crate::{
    db::{
        Direction,
        index::ID_FIELD,
        key::{
            KeyBounds, document_prefix, encode_component, index_prefix, prefix_successor,
            push_terminated_bytes,
        },
        query::{Access, CursorError, RangeOptions},
    },
    value::{Document, FieldValue, Scalar},
};
use std::ops::Bound;

fn cursor_id(cursor: &Document) -> Result<Option<&str>, CursorError> {
    match cursor.get(ID_FIELD) {
        None => Ok(None),
        Some(FieldValue::Scalar(Scalar::Text(id))) => Ok(Some(id)),
        Some(_) => Err(CursorError::IdNotText),
    }
}

/// Encode a cursor as a key prefix under `base`.
///
/// `None` means the cursor names nothing and does not bound the scan.
fn cursor_key(base: &[u8], access: &Access, cursor: &Document) -> Result<Option<Vec<u8>>, CursorError> {
    let id = cursor_id(cursor)?;
    let mut out = base.to_vec();

    match access {
        Access::Primary { .. } => {
            if let Some(field) = cursor.field_names().find(|name| *name != ID_FIELD) {
                return Err(CursorError::UnknownField {
                    field: field.to_string(),
                });
            }
            let Some(id) = id else {
                return Ok(None);
            };
            push_terminated_bytes(&mut out, id.as_bytes());
        }

        Access::Index(def) => {
            let sort = def.sort();
            if let Some(field) = cursor
                .field_names()
                .find(|name| *name != ID_FIELD && !sort.covers(name))
            {
                return Err(CursorError::UnknownField {
                    field: field.to_string(),
                });
            }

            // Present fields must be a leading run of the sort.
            let named = cursor.field_names().filter(|name| *name != ID_FIELD).count();
            for field in &sort.fields()[..named] {
                if !cursor.contains(field.name()) {
                    return Err(CursorError::NotAPrefix {
                        missing: field.name().to_string(),
                    });
                }
            }
            if id.is_some() && named < sort.len() {
                return Err(CursorError::IdWithoutFullTuple);
            }
            if named == 0 && id.is_none() {
                return Ok(None);
            }

            for field in &sort.fields()[..named] {
                if let Some(value) = cursor.get(field.name()) {
                    encode_component(&mut out, value, field.direction());
                }
            }
            if let Some(id) = id {
                push_terminated_bytes(&mut out, id.as_bytes());
            }
        }
    }

    Ok(Some(out))
}

fn pick<'a>(
    inclusive: Option<&'a Document>,
    exclusive: Option<&'a Document>,
    label: &'static str,
) -> Result<Option<(&'a Document, bool)>, CursorError> {
    match (inclusive, exclusive) {
        (Some(_), Some(_)) => Err(CursorError::Conflicting(label)),
        (Some(cursor), None) => Ok(Some((cursor, true))),
        (None, Some(cursor)) => Ok(Some((cursor, false))),
        (None, None) => Ok(None),
    }
}

// Lower bound at a cursor prefix: inclusive keeps every key extending it.
fn lower_bound(prefix: Vec<u8>, inclusive: bool) -> Bound<Vec<u8>> {
    if inclusive {
        return Bound::Included(prefix);
    }

    match prefix_successor(&prefix) {
        Some(next) => Bound::Included(next),
        None => Bound::Excluded(prefix),
    }
}

// Upper bound at a cursor prefix: inclusive admits every key extending it.
fn upper_bound(prefix: Vec<u8>, inclusive: bool) -> Bound<Vec<u8>> {
    if !inclusive {
        return Bound::Excluded(prefix);
    }

    prefix_successor(&prefix).map_or(Bound::Unbounded, Bound::Excluded)
}

/// Derive the scan envelope and direction for a range over `access`.
///
/// Start cursors bound the beginning of iteration: the lower key bound when
/// iterating forward, the upper when iterating in reverse.
pub(in crate::db) fn range_bounds(
    path: &str,
    access: &Access,
    options: &RangeOptions,
) -> Result<(KeyBounds, Direction), CursorError> {
    let base = match access {
        Access::Primary { .. } => document_prefix(path),
        Access::Index(def) => index_prefix(path, def),
    };
    let reverse = match access {
        Access::Primary { descending } => options.reverse != *descending,
        Access::Index(_) => options.reverse,
    };

    let start = pick(
        options.start_at.as_ref(),
        options.start_after.as_ref(),
        "startAt/startAfter",
    )?;
    let end = pick(
        options.end_at.as_ref(),
        options.end_before.as_ref(),
        "endAt/endBefore",
    )?;

    let encode = |cursor: Option<(&Document, bool)>| -> Result<Option<(Vec<u8>, bool)>, CursorError> {
        let Some((doc, inclusive)) = cursor else {
            return Ok(None);
        };

        Ok(cursor_key(base.as_bytes(), access, doc)?.map(|key| (key, inclusive)))
    };
    let start = encode(start)?;
    let end = encode(end)?;

    let (low, high) = if reverse { (end, start) } else { (start, end) };
    let mut bounds = KeyBounds::prefix(base.as_bytes());
    if let Some((prefix, inclusive)) = low {
        bounds.lower = lower_bound(prefix, inclusive);
    }
    if let Some((prefix, inclusive)) = high {
        let upper = upper_bound(prefix, inclusive);
        if !matches!(upper, Bound::Unbounded) {
            bounds.upper = upper;
        }
    }

    let direction = if reverse { Direction::Desc } else { Direction::Asc };

    Ok((bounds, direction))
}
