use crate::{
    db::{
        Direction,
        backend::WriteBatch,
        diff::{Delta, EntryRef},
        index::{IndexCatalog, IndexDef, SortSpec},
        key::{fanout_key, index_entry_key},
    },
    value::Document,
};

///
/// IndexMutationCounts
///
/// Planned key mutations for one document write.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IndexMutationCounts {
    pub index_inserts: u64,
    pub index_removes: u64,
    pub fanout_inserts: u64,
    pub fanout_removes: u64,
}

///
/// IndexMutation
///
/// Everything needed to turn one document delta into index key mutations.
///

pub(in crate::db) struct IndexMutation<'a> {
    pub(in crate::db) path: &'a str,
    pub(in crate::db) id: &'a str,
    pub(in crate::db) catalog: &'a IndexCatalog,
    pub(in crate::db) auto_field_indexes: bool,
    pub(in crate::db) prev: &'a Document,
    pub(in crate::db) next: &'a Document,
}

impl IndexMutation<'_> {
    fn remove(&self, def: &IndexDef, batch: &mut WriteBatch, counts: &mut IndexMutationCounts) {
        if let Some(key) = index_entry_key(self.path, def, self.id, self.prev) {
            batch.delete(key.into_bytes());
            counts.index_removes += 1;
        }
    }

    fn insert(&self, def: &IndexDef, batch: &mut WriteBatch, counts: &mut IndexMutationCounts) {
        if let Some(key) = index_entry_key(self.path, def, self.id, self.next) {
            batch.put(key.into_bytes(), self.id.as_bytes());
            counts.index_inserts += 1;
        }
    }

    /// Stage every index and fan-out mutation implied by `delta`.
    ///
    /// Ordering inside the batch: implicit per-field entries and fan-out
    /// entries follow the delta lists (dels, changes, news), then registered
    /// composite indexes follow catalog order.
    pub(in crate::db) fn plan(&self, delta: &Delta, batch: &mut WriteBatch) -> IndexMutationCounts {
        let mut counts = IndexMutationCounts::default();

        // ------------------------------------------------------------------
        // Phase 1: removed entries
        // ------------------------------------------------------------------
        for entry in &delta.dels {
            match entry {
                EntryRef::Field(field) => {
                    for def in self.implicit_defs(field) {
                        self.remove(&def, batch, &mut counts);
                    }
                }
                EntryRef::ArrayElement { field, hash } => {
                    batch.delete(fanout_key(self.path, field, hash, self.id).into_bytes());
                    counts.fanout_removes += 1;
                }
            }
        }

        // ------------------------------------------------------------------
        // Phase 2: rewritten field entries
        // ------------------------------------------------------------------
        for entry in &delta.changes {
            for def in self.implicit_defs(entry.field_name()) {
                self.remove(&def, batch, &mut counts);
                self.insert(&def, batch, &mut counts);
            }
        }

        // ------------------------------------------------------------------
        // Phase 3: new entries
        // ------------------------------------------------------------------
        for entry in &delta.news {
            match entry {
                EntryRef::Field(field) => {
                    for def in self.implicit_defs(field) {
                        self.insert(&def, batch, &mut counts);
                    }
                }
                EntryRef::ArrayElement { field, hash } => {
                    batch.put(
                        fanout_key(self.path, field, hash, self.id).into_bytes(),
                        self.id.as_bytes(),
                    );
                    counts.fanout_inserts += 1;
                }
            }
        }

        // ------------------------------------------------------------------
        // Phase 4: registered composite indexes
        // ------------------------------------------------------------------
        let touched = delta.touched_fields();
        for def in self.catalog.iter() {
            if self.auto_field_indexes && def.sort().is_single_field() {
                continue;
            }
            if !def.sort().fields().iter().any(|f| touched.contains(f.name())) {
                continue;
            }

            let old = index_entry_key(self.path, def, self.id, self.prev);
            let new = index_entry_key(self.path, def, self.id, self.next);
            if old == new {
                continue;
            }
            if let Some(old) = old {
                batch.delete(old.into_bytes());
                counts.index_removes += 1;
            }
            if let Some(new) = new {
                batch.put(new.into_bytes(), self.id.as_bytes());
                counts.index_inserts += 1;
            }
        }

        counts
    }

    // Implicit single-field indexes, both directions, when enabled.
    fn implicit_defs(&self, field: &str) -> Vec<IndexDef> {
        if !self.auto_field_indexes {
            return Vec::new();
        }

        [Direction::Asc, Direction::Desc]
            .into_iter()
            .map(|direction| IndexDef::new(SortSpec::single(field, direction)))
            .collect()
    }
}
