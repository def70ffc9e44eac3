use crate::Error;
use serde_json::Value as JsonValue;
use tessera_core::{
    db::{
        Db, WriteReport,
        backend::Backend,
        index::SortSpec,
        query::{Entry, RangeOptions},
    },
    value::{Document, Scalar},
};

///
/// Collection
///
/// A `Db` bound to one collection path, speaking JSON documents, sort
/// descriptors and range options in their wire form.
///

pub struct Collection<'db, B: Backend> {
    db: &'db mut Db<B>,
    path: String,
}

impl<'db, B: Backend> Collection<'db, B> {
    pub fn new(db: &'db mut Db<B>, path: impl Into<String>) -> Self {
        Self {
            db,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self, id: &str) -> Result<Option<JsonValue>, Error> {
        let doc = self.db.get(&self.path, id)?;

        Ok(doc.as_ref().map(Document::to_json))
    }

    pub fn put(&mut self, value: &JsonValue, id: &str) -> Result<WriteReport, Error> {
        let doc = Document::from_json(value)?;

        Ok(self.db.put(&self.path, id, doc)?)
    }

    pub fn del(&mut self, id: &str) -> Result<WriteReport, Error> {
        Ok(self.db.del(&self.path, id)?)
    }

    /// `sort = None` walks the primary id order.
    pub fn range(
        &self,
        sort: Option<&JsonValue>,
        options: &JsonValue,
    ) -> Result<Vec<(String, JsonValue)>, Error> {
        let sort = sort.map(SortSpec::from_json).transpose()?;
        let options = RangeOptions::from_json(options)?;
        let entries = self.db.range(&self.path, sort.as_ref(), &options)?;

        Ok(entries.into_iter().map(into_pair).collect())
    }

    /// Documents whose array `field` holds `element`, in id order.
    pub fn contains(
        &self,
        field: &str,
        element: &Scalar,
        options: &JsonValue,
    ) -> Result<Vec<(String, JsonValue)>, Error> {
        let options = RangeOptions::from_json(options)?;
        let entries = self.db.contains(&self.path, field, element, &options)?;

        Ok(entries.into_iter().map(into_pair).collect())
    }

    pub fn add_index(&mut self, sort: &JsonValue) -> Result<bool, Error> {
        let sort = SortSpec::from_json(sort)?;

        Ok(self.db.add_index(&self.path, &sort)?)
    }

    pub fn remove_index(&mut self, sort: &JsonValue) -> Result<bool, Error> {
        let sort = SortSpec::from_json(sort)?;

        Ok(self.db.remove_index(&self.path, &sort)?)
    }

    /// Registered sort descriptors in wire form.
    pub fn get_indexes(&self) -> Result<Vec<JsonValue>, Error> {
        let sorts = self.db.get_indexes(&self.path)?;

        Ok(sorts.iter().map(SortSpec::to_json).collect())
    }

    pub fn digest(&self) -> Result<[u8; 32], Error> {
        Ok(self.db.digest(&self.path)?)
    }
}

fn into_pair(entry: Entry) -> (String, JsonValue) {
    (entry.key, entry.val.to_json())
}
