//! Write staging and commit.
//!
//! Contract: every backend mutation of one logical write is staged into a
//! single `WriteBatch` before anything is committed. Index and fan-out ops are
//! staged before the document op, so a backend that commits sequentially
//! never exposes a document whose index entries are missing.

use crate::{
    db::{
        backend::{Backend, WriteBatch},
        diff::Delta,
        index::{IndexCatalog, IndexMutation, IndexMutationCounts},
        key::document_key,
    },
    error::InternalError,
    obs::sink::{MetricsEvent, record},
    value::Document,
};

///
/// PreparedWrite
///

#[derive(Debug)]
pub(in crate::db) struct PreparedWrite {
    batch: WriteBatch,
    counts: IndexMutationCounts,
}

impl PreparedWrite {
    /// Stage a document put (`row = Some`) or delete (`row = None`).
    #[expect(clippy::too_many_arguments)]
    pub(in crate::db) fn document(
        path: &str,
        id: &str,
        catalog: &IndexCatalog,
        auto_field_indexes: bool,
        prev: &Document,
        next: &Document,
        delta: &Delta,
        row: Option<Vec<u8>>,
    ) -> Self {
        let mut batch = WriteBatch::new();

        // index ops first
        let counts = IndexMutation {
            path,
            id,
            catalog,
            auto_field_indexes,
            prev,
            next,
        }
        .plan(delta, &mut batch);

        // then the data op
        let key = document_key(path, id).into_bytes();
        match row {
            Some(bytes) => batch.put(key, bytes),
            None => batch.delete(key),
        }

        Self { batch, counts }
    }

    /// Commit as one batch, then report index activity.
    pub(in crate::db) fn commit<B: Backend>(
        self,
        backend: &mut B,
        path: &str,
    ) -> Result<IndexMutationCounts, InternalError> {
        let Self { batch, counts } = self;
        backend.commit(batch)?;

        record(MetricsEvent::IndexDelta {
            collection: path,
            inserts: counts.index_inserts,
            removes: counts.index_removes,
        });
        record(MetricsEvent::FanoutDelta {
            collection: path,
            inserts: counts.fanout_inserts,
            removes: counts.fanout_removes,
        });

        Ok(counts)
    }
}
