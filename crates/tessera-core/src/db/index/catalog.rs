use crate::{
    db::{
        backend::{Backend, WriteBatch},
        index::{IndexDef, SortSpec},
        key::catalog_key,
    },
    error::InternalError,
    serialize::{deserialize, serialize},
};
use std::collections::BTreeMap;

/// Upper bound on one persisted catalog blob.
const MAX_CATALOG_BYTES: usize = 1024 * 1024;

///
/// IndexCatalog
///
/// Registered indexes of one collection, in registration order.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(in crate::db) struct IndexCatalog {
    indexes: Vec<IndexDef>,
}

impl IndexCatalog {
    pub(in crate::db) fn contains(&self, sort: &SortSpec) -> bool {
        self.indexes.iter().any(|def| def.sort() == sort)
    }

    pub(in crate::db) fn get(&self, sort: &SortSpec) -> Option<&IndexDef> {
        self.indexes.iter().find(|def| def.sort() == sort)
    }

    /// Returns false when already registered.
    pub(in crate::db) fn insert(&mut self, def: IndexDef) -> bool {
        if self.contains(def.sort()) {
            return false;
        }
        self.indexes.push(def);

        true
    }

    pub(in crate::db) fn remove(&mut self, sort: &SortSpec) -> Option<IndexDef> {
        let pos = self.indexes.iter().position(|def| def.sort() == sort)?;

        Some(self.indexes.remove(pos))
    }

    pub(in crate::db) fn iter(&self) -> impl Iterator<Item = &IndexDef> {
        self.indexes.iter()
    }

    pub(in crate::db) fn sorts(&self) -> Vec<SortSpec> {
        self.indexes.iter().map(|def| def.sort().clone()).collect()
    }

    /// Load the persisted catalog; a missing blob is an empty catalog.
    pub(in crate::db) fn load<B: Backend>(backend: &B, path: &str) -> Result<Self, InternalError> {
        let Some(bytes) = backend.get(catalog_key(path).as_bytes())? else {
            return Ok(Self::default());
        };

        let sorts: Vec<SortSpec> = deserialize(&bytes, MAX_CATALOG_BYTES)?;
        let mut catalog = Self::default();
        for sort in sorts {
            if !catalog.insert(IndexDef::new(sort)) {
                return Err(InternalError::index_corruption(format!(
                    "catalog for '{path}' lists an index twice"
                )));
            }
        }

        Ok(catalog)
    }

    /// Stage the catalog blob; an empty catalog deletes it.
    pub(in crate::db) fn stage(&self, path: &str, batch: &mut WriteBatch) -> Result<(), InternalError> {
        let key = catalog_key(path).into_bytes();
        if self.indexes.is_empty() {
            batch.delete(key);
        } else {
            batch.put(key, serialize(&self.sorts())?);
        }

        Ok(())
    }
}

///
/// IndexCache
///
/// Per-collection catalog cache. Entries are only replaced after the backend
/// commit that persisted them succeeds.
///

#[derive(Debug, Default)]
pub(in crate::db) struct IndexCache {
    catalogs: BTreeMap<String, IndexCatalog>,
}

impl IndexCache {
    pub(in crate::db) fn get(&self, path: &str) -> Option<&IndexCatalog> {
        self.catalogs.get(path)
    }

    pub(in crate::db) fn insert(&mut self, path: &str, catalog: IndexCatalog) {
        self.catalogs.insert(path.to_string(), catalog);
    }

    pub(in crate::db) fn clear(&mut self) {
        self.catalogs.clear();
    }
}
