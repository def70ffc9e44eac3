//! Module: db::index
//! Responsibility: index descriptors, the per-collection catalog, and
//! planning of index key mutations (incremental, back-fill, teardown).
//! Does not own: key byte layout (see `db::key`) or commit (see `db::commit`).

mod catalog;
mod plan;
mod rebuild;
mod sort;

#[cfg(test)]
mod tests;

pub(in crate::db) use catalog::{IndexCache, IndexCatalog};
pub use plan::IndexMutationCounts;
pub(in crate::db) use plan::IndexMutation;
pub(in crate::db) use rebuild::{bound_ref, plan_backfill, plan_teardown};
pub use sort::{ID_FIELD, IndexDef, IndexId, SortError, SortField, SortSpec};

/// Resolve the index serving `sort`, if one is maintained.
///
/// Implicit single-field indexes exist for every field when
/// `auto_field_indexes` is set; everything else must be registered.
pub(in crate::db) fn resolve_index(
    catalog: &IndexCatalog,
    sort: &SortSpec,
    auto_field_indexes: bool,
) -> Option<IndexDef> {
    if auto_field_indexes && sort.is_single_field() {
        return Some(IndexDef::new(sort.clone()));
    }

    catalog.get(sort).cloned()
}
