use crate::value::{FieldValue, ValueError};
use serde::{Deserialize, Serialize};

///
/// Document
///
/// Ordered map of top-level fields.
/// Insertion order is preserved and persisted; index maintenance walks fields
/// in this order, so two documents with the same fields in a different order
/// are equal as values but produce differently ordered deltas.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(try_from = "Vec<(String, FieldValue)>", into = "Vec<(String, FieldValue)>")]
pub struct Document {
    fields: Vec<(String, FieldValue)>,
}

impl Document {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a document from ordered `(name, value)` pairs.
    pub fn try_from_fields<I, K, V>(fields: I) -> Result<Self, ValueError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut doc = Self::new();
        for (name, value) in fields {
            let name = name.into();
            if doc.contains(&name) {
                return Err(ValueError::DuplicateField(name));
            }
            doc.insert(name, value)?;
        }

        Ok(doc)
    }

    /// Insert or replace a field. Replacing keeps the original position.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<Option<FieldValue>, ValueError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValueError::EmptyFieldName);
        }

        let value = value.into();
        if let Some((_, slot)) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            return Ok(Some(std::mem::replace(slot, value)));
        }

        self.fields.push((name, value));
        Ok(None)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(n, _)| n == name)?;

        Some(self.fields.remove(pos).1)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find_map(|(n, value)| (n == name).then_some(value))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// Field order is part of the stored form, not of value equality.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for Document {}

impl TryFrom<Vec<(String, FieldValue)>> for Document {
    type Error = ValueError;

    fn try_from(fields: Vec<(String, FieldValue)>) -> Result<Self, Self::Error> {
        Self::try_from_fields(fields)
    }
}

impl From<Document> for Vec<(String, FieldValue)> {
    fn from(doc: Document) -> Self {
        doc.fields
    }
}
