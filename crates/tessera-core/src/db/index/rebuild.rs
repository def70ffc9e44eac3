use crate::{
    db::{
        Direction,
        backend::{Backend, WriteBatch},
        data::StoredRow,
        index::IndexDef,
        key::{KeyBounds, document_prefix, fanout_key, index_entry_key, index_prefix},
    },
    error::InternalError,
    hash::ElementHash,
};
use std::ops::Bound;

///
/// RebuildReport
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(in crate::db) struct RebuildReport {
    pub(in crate::db) rows: u64,
    pub(in crate::db) index_entries: u64,
    pub(in crate::db) fanout_entries: u64,
}

fn scan_all<B: Backend>(
    backend: &B,
    bounds: &KeyBounds,
) -> Result<Vec<(Vec<u8>, Vec<u8>)>, InternalError> {
    if bounds.is_empty() {
        return Ok(Vec::new());
    }

    let rows = backend.scan(
        bound_ref(&bounds.lower),
        bound_ref(&bounds.upper),
        Direction::Asc,
        None,
    )?;

    Ok(rows)
}

pub(in crate::db) fn bound_ref(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    bound.as_ref().map(Vec::as_slice)
}

/// Stage back-fill writes for `def` over every stored document of `path`.
///
/// Fan-out entries for array fields in the sort are re-asserted; they are
/// keyed per document and element, so re-putting them is idempotent.
pub(in crate::db) fn plan_backfill<B: Backend>(
    backend: &B,
    path: &str,
    def: &IndexDef,
    max_row_bytes: usize,
    batch: &mut WriteBatch,
) -> Result<RebuildReport, InternalError> {
    let mut report = RebuildReport::default();
    let rows = scan_all(backend, &KeyBounds::prefix(document_prefix(path).as_bytes()))?;

    for (_, bytes) in rows {
        let StoredRow { id, doc } = StoredRow::decode(&bytes, max_row_bytes)?;
        report.rows += 1;

        if let Some(key) = index_entry_key(path, def, &id, &doc) {
            batch.put(key.into_bytes(), id.as_bytes());
            report.index_entries += 1;
        }

        for field in def.sort().fields() {
            let Some(items) = doc.get(field.name()).and_then(|v| v.as_array()) else {
                continue;
            };
            for element in items {
                let hash = ElementHash::of(element);
                batch.put(fanout_key(path, field.name(), &hash, &id).into_bytes(), id.as_bytes());
                report.fanout_entries += 1;
            }
        }
    }

    Ok(report)
}

/// Stage deletion of every entry of `def`. Returns the number of entries.
pub(in crate::db) fn plan_teardown<B: Backend>(
    backend: &B,
    path: &str,
    def: &IndexDef,
    batch: &mut WriteBatch,
) -> Result<u64, InternalError> {
    let rows = scan_all(backend, &KeyBounds::prefix(index_prefix(path, def).as_bytes()))?;
    let mut removed = 0;
    for (key, _) in rows {
        batch.delete(key);
        removed += 1;
    }

    Ok(removed)
}
