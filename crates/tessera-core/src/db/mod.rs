//! Module: db
//! Responsibility: the `Db` handle and its collection operations.
//! Does not own: value semantics (see `value`) or metrics state (see `obs`).

pub mod backend;
mod commit;
mod data;
pub mod diff;
mod direction;
pub mod index;
mod key;
pub mod query;


pub use direction::Direction;

use crate::{
    config::DbConfig,
    db::{
        backend::{Backend, MemoryBackend},
        commit::PreparedWrite,
        data::StoredRow,
        diff::compute_delta,
        index::{
            ID_FIELD, IndexCache, IndexCatalog, IndexDef, IndexMutationCounts, SortSpec,
            bound_ref, plan_backfill, plan_teardown, resolve_index,
        },
        key::{KeyBounds, KeySpace, document_key, fanout_prefix, keyspace_prefix},
        query::{Access, CursorError, Entry, RangeOptions, range_bounds},
    },
    error::{ErrorOrigin, InternalError},
    hash::ElementHash,
    obs::sink::{ExecKind, MetricsEvent, Span, record},
    value::{Document, Scalar},
};
use sha2::{Digest, Sha256};
use std::cell::RefCell;

///
/// WriteReport
///
/// Outcome of one `put` or `del`.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WriteReport {
    /// No document existed under the id before the write.
    pub created: bool,
    /// A stored document was removed.
    pub deleted: bool,
    pub index: IndexMutationCounts,
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

fn validate_path(path: &str) -> Result<(), InternalError> {
    if path.is_empty() {
        return Err(InternalError::validation(
            ErrorOrigin::Key,
            "collection path must not be empty",
        ));
    }

    Ok(())
}

fn validate_id(id: &str) -> Result<(), InternalError> {
    if id.is_empty() {
        return Err(InternalError::validation(
            ErrorOrigin::Key,
            "document id must not be empty",
        ));
    }

    Ok(())
}

///
/// Db
///
/// Indexed document collections over one ordered backend.
///
/// Mutations take `&mut self`, so the borrow checker serializes them; reads
/// take `&self` and only ever observe fully committed batches.
///

pub struct Db<B: Backend> {
    backend: B,
    cache: RefCell<IndexCache>,
    config: DbConfig,
}

impl Db<MemoryBackend> {
    /// Fresh in-memory database with default configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: Backend> Db<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: RefCell::new(IndexCache::default()),
            config: DbConfig::default(),
        }
    }

    pub fn with_config(backend: B, config: DbConfig) -> Result<Self, InternalError> {
        config.validate()?;

        Ok(Self {
            backend,
            cache: RefCell::new(IndexCache::default()),
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &DbConfig {
        &self.config
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Drop cached catalogs; the next access reloads them from the backend.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    fn catalog(&self, path: &str) -> Result<IndexCatalog, InternalError> {
        if let Some(catalog) = self.cache.borrow().get(path) {
            return Ok(catalog.clone());
        }

        let catalog = IndexCatalog::load(&self.backend, path)?;
        self.cache.borrow_mut().insert(path, catalog.clone());

        Ok(catalog)
    }

    fn load_row(&self, path: &str, id: &str) -> Result<Option<StoredRow>, InternalError> {
        let Some(bytes) = self.backend.get(document_key(path, id).as_bytes())? else {
            return Ok(None);
        };

        StoredRow::decode(&bytes, self.config.max_document_bytes).map(Some)
    }

    fn scan(
        &self,
        path: &str,
        bounds: &KeyBounds,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, InternalError> {
        if bounds.is_empty() || limit == Some(0) {
            return Ok(Vec::new());
        }

        let rows = self.backend.scan(
            bound_ref(&bounds.lower),
            bound_ref(&bounds.upper),
            direction,
            limit,
        )?;
        record(MetricsEvent::RowsScanned {
            collection: path,
            rows_scanned: count(rows.len()),
        });

        Ok(rows)
    }

    // Secondary-entry values hold the document id; load each document.
    fn load_referenced(
        &self,
        path: &str,
        rows: Vec<(Vec<u8>, Vec<u8>)>,
    ) -> Result<Vec<Entry>, InternalError> {
        rows.into_iter()
            .map(|(_, value)| {
                let id = String::from_utf8(value).map_err(|_| {
                    InternalError::index_corruption(format!(
                        "index entry in '{path}' holds a non-utf8 document id"
                    ))
                })?;
                let row = self.load_row(path, &id)?.ok_or_else(|| {
                    InternalError::index_invariant(format!(
                        "index entry in '{path}' references missing document '{id}'"
                    ))
                })?;

                Ok(Entry {
                    key: row.id,
                    val: row.doc,
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Stored document under `id`; absence is `Ok(None)`.
    pub fn get(&self, path: &str, id: &str) -> Result<Option<Document>, InternalError> {
        validate_path(path)?;
        validate_id(id)?;

        let mut span = Span::new(ExecKind::Get, path);
        let row = self.load_row(path, id)?;
        span.set_rows(u64::from(row.is_some()));

        Ok(row.map(|row| row.doc))
    }

    /// Ordered documents along `sort` (primary id order when `None`).
    ///
    /// A sort that is neither the primary order nor a maintained index yields
    /// an empty result.
    pub fn range(
        &self,
        path: &str,
        sort: Option<&SortSpec>,
        options: &RangeOptions,
    ) -> Result<Vec<Entry>, InternalError> {
        validate_path(path)?;
        if let Some(sort) = sort {
            sort.validate_width(self.config.max_index_fields)?;
        }

        let access = match sort {
            None => Access::Primary { descending: false },
            Some(sort) => match sort.primary_direction() {
                Some(direction) => Access::Primary {
                    descending: direction == Direction::Desc,
                },
                None => Access::Index(IndexDef::new(sort.clone())),
            },
        };
        let (bounds, direction) = range_bounds(path, &access, options)?;

        let mut span = Span::new(ExecKind::Range, path);
        if let Access::Index(def) = &access {
            let catalog = self.catalog(path)?;
            if resolve_index(&catalog, def.sort(), self.config.auto_field_indexes).is_none() {
                return Ok(Vec::new());
            }
        }

        let limit = options.limit.or(self.config.default_range_limit);
        let rows = self.scan(path, &bounds, direction, limit)?;
        let entries = match access {
            Access::Primary { .. } => rows
                .into_iter()
                .map(|(_, bytes)| {
                    let StoredRow { id, doc } =
                        StoredRow::decode(&bytes, self.config.max_document_bytes)?;

                    Ok(Entry { key: id, val: doc })
                })
                .collect::<Result<Vec<_>, InternalError>>()?,
            Access::Index(_) => self.load_referenced(path, rows)?,
        };
        span.set_rows(count(entries.len()));

        Ok(entries)
    }

    /// Documents whose array `field` holds `element`, in id order.
    ///
    /// Honours `reverse` and `limit`; cursor bounds are rejected.
    pub fn contains(
        &self,
        path: &str,
        field: &str,
        element: &Scalar,
        options: &RangeOptions,
    ) -> Result<Vec<Entry>, InternalError> {
        validate_path(path)?;
        if field.is_empty() {
            return Err(InternalError::validation(
                ErrorOrigin::Query,
                "contains field must not be empty",
            ));
        }
        if options.has_cursor() {
            return Err(CursorError::Unsupported("contains").into());
        }

        let mut span = Span::new(ExecKind::Contains, path);
        let prefix = fanout_prefix(path, field, &ElementHash::of(element));
        let direction = if options.reverse {
            Direction::Desc
        } else {
            Direction::Asc
        };
        let limit = options.limit.or(self.config.default_range_limit);
        let rows = self.scan(path, &KeyBounds::prefix(prefix.as_bytes()), direction, limit)?;
        let entries = self.load_referenced(path, rows)?;
        span.set_rows(count(entries.len()));

        Ok(entries)
    }

    /// Registered index definitions in registration order.
    ///
    /// Implicit single-field indexes are not listed.
    pub fn get_indexes(&self, path: &str) -> Result<Vec<SortSpec>, InternalError> {
        validate_path(path)?;

        Ok(self.catalog(path)?.sorts())
    }

    /// SHA-256 over every key and value the collection owns, in key order.
    pub fn digest(&self, path: &str) -> Result<[u8; 32], InternalError> {
        validate_path(path)?;

        let mut hasher = Sha256::new();
        for space in KeySpace::ALL {
            let prefix = keyspace_prefix(space, path);
            let bounds = KeyBounds::prefix(prefix.as_bytes());
            for (key, value) in self.scan(path, &bounds, Direction::Asc, None)? {
                hasher.update(count(key.len()).to_be_bytes());
                hasher.update(&key);
                hasher.update(count(value.len()).to_be_bytes());
                hasher.update(&value);
            }
        }

        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());

        Ok(out)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Insert or replace the document under `id`, maintaining every index.
    pub fn put(&mut self, path: &str, id: &str, doc: Document) -> Result<WriteReport, InternalError> {
        validate_path(path)?;
        validate_id(id)?;
        if doc.contains(ID_FIELD) {
            return Err(InternalError::validation(
                ErrorOrigin::Value,
                format!("'{ID_FIELD}' is reserved and cannot be stored as a field"),
            ));
        }
        let row = StoredRow::new(id.to_string(), doc);
        let bytes = row.encode(self.config.max_document_bytes)?;

        let mut span = Span::new(ExecKind::Put, path);
        let catalog = self.catalog(path)?;
        let prev = self.load_row(path, id)?;
        let created = prev.is_none();
        let prev = prev.map(|row| row.doc).unwrap_or_default();

        let delta = compute_delta(&prev, &row.doc);
        let prepared = PreparedWrite::document(
            path,
            id,
            &catalog,
            self.config.auto_field_indexes,
            &prev,
            &row.doc,
            &delta,
            Some(bytes),
        );
        let index = prepared.commit(&mut self.backend, path)?;
        span.set_rows(1);

        Ok(WriteReport {
            created,
            deleted: false,
            index,
        })
    }

    /// Remove the document under `id` and every entry it owned.
    ///
    /// Deleting a missing id is a no-op.
    pub fn del(&mut self, path: &str, id: &str) -> Result<WriteReport, InternalError> {
        validate_path(path)?;
        validate_id(id)?;

        let mut span = Span::new(ExecKind::Delete, path);
        let Some(StoredRow { doc: prev, .. }) = self.load_row(path, id)? else {
            return Ok(WriteReport::default());
        };
        let catalog = self.catalog(path)?;

        let next = Document::new();
        let delta = compute_delta(&prev, &next);
        let prepared = PreparedWrite::document(
            path,
            id,
            &catalog,
            self.config.auto_field_indexes,
            &prev,
            &next,
            &delta,
            None,
        );
        let index = prepared.commit(&mut self.backend, path)?;
        span.set_rows(1);

        Ok(WriteReport {
            created: false,
            deleted: true,
            index,
        })
    }

    /// Register `sort` and back-fill it from every stored document.
    ///
    /// Returns `Ok(false)` when nothing had to be registered: the index
    /// already exists, is the primary order, or is an implicit single-field
    /// index.
    pub fn add_index(&mut self, path: &str, sort: &SortSpec) -> Result<bool, InternalError> {
        validate_path(path)?;
        sort.validate_width(self.config.max_index_fields)?;
        if sort.primary_direction().is_some()
            || (self.config.auto_field_indexes && sort.is_single_field())
        {
            return Ok(false);
        }

        let _span = Span::new(ExecKind::AddIndex, path);
        let mut catalog = self.catalog(path)?;
        let def = IndexDef::new(sort.clone());
        if !catalog.insert(def.clone()) {
            return Ok(false);
        }

        let mut batch = backend::WriteBatch::new();
        let report = plan_backfill(
            &self.backend,
            path,
            &def,
            self.config.max_document_bytes,
            &mut batch,
        )?;
        catalog.stage(path, &mut batch)?;
        self.backend.commit(batch)?;
        self.cache.borrow_mut().insert(path, catalog);

        record(MetricsEvent::Backfill {
            collection: path,
            rows: report.rows,
        });
        record(MetricsEvent::IndexDelta {
            collection: path,
            inserts: report.index_entries,
            removes: 0,
        });
        record(MetricsEvent::FanoutDelta {
            collection: path,
            inserts: report.fanout_entries,
            removes: 0,
        });

        Ok(true)
    }

    /// Erase every entry of `sort` and unregister it.
    ///
    /// Returns `Ok(false)` when `sort` was not registered.
    pub fn remove_index(&mut self, path: &str, sort: &SortSpec) -> Result<bool, InternalError> {
        validate_path(path)?;
        sort.validate_width(self.config.max_index_fields)?;
        if sort.primary_direction().is_some()
            || (self.config.auto_field_indexes && sort.is_single_field())
        {
            return Ok(false);
        }

        let _span = Span::new(ExecKind::RemoveIndex, path);
        let mut catalog = self.catalog(path)?;
        let Some(def) = catalog.remove(sort) else {
            return Ok(false);
        };

        let mut batch = backend::WriteBatch::new();
        let removed = plan_teardown(&self.backend, path, &def, &mut batch)?;
        catalog.stage(path, &mut batch)?;
        self.backend.commit(batch)?;
        self.cache.borrow_mut().insert(path, catalog);

        record(MetricsEvent::IndexDelta {
            collection: path,
            inserts: 0,
            removes: removed,
        });

        Ok(true)
    }
}
