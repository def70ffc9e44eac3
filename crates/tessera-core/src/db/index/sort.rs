use crate::{
    db::{Direction, key::push_terminated_bytes},
    error::{ErrorOrigin, InternalError},
    hash::xxh3_128,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::{collections::BTreeSet, fmt};
use thiserror::Error as ThisError;

/// Reserved pseudo-field naming the document id.
pub const ID_FIELD: &str = "__id__";

///
/// SortError
///

#[derive(Debug, ThisError)]
pub enum SortError {
    #[error("sort descriptor must name at least one field")]
    Empty,

    #[error("sort field name must not be empty")]
    EmptyFieldName,

    #[error("unknown sort direction '{direction}' for field '{field}'")]
    UnknownDirection { field: String, direction: String },

    #[error("field '{0}' appears more than once in sort descriptor")]
    DuplicateField(String),

    #[error("'__id__' may only be used as the sole sort field")]
    ReservedIdField,

    #[error("sort descriptor has {found} fields, limit is {max}")]
    TooManyFields { found: usize, max: usize },

    #[error("malformed sort descriptor: {0}")]
    Malformed(String),
}

impl From<SortError> for InternalError {
    fn from(err: SortError) -> Self {
        Self::validation(ErrorOrigin::Index, err.to_string())
    }
}

///
/// SortField
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SortField {
    name: String,
    direction: Direction,
}

impl SortField {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

///
/// SortSpec
///
/// Ordered, validated sort descriptor. Identifies one index within a
/// collection; two specs are the same index iff they are equal.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SortSpec {
    fields: Vec<SortField>,
}

impl SortSpec {
    pub fn new(fields: Vec<SortField>) -> Result<Self, SortError> {
        if fields.is_empty() {
            return Err(SortError::Empty);
        }

        let mut seen = BTreeSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(SortError::EmptyFieldName);
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SortError::DuplicateField(field.name.clone()));
            }
        }
        if fields.len() > 1 && seen.contains(ID_FIELD) {
            return Err(SortError::ReservedIdField);
        }

        Ok(Self { fields })
    }

    /// Build from `(field, "asc" | "desc")` pairs.
    pub fn try_from_pairs<I, F, D>(pairs: I) -> Result<Self, SortError>
    where
        I: IntoIterator<Item = (F, D)>,
        F: Into<String>,
        D: AsRef<str>,
    {
        let fields = pairs
            .into_iter()
            .map(|(name, direction)| {
                let name = name.into();
                let direction = direction.as_ref();
                Direction::parse(direction)
                    .map(|dir| SortField::new(name.clone(), dir))
                    .ok_or_else(|| SortError::UnknownDirection {
                        field: name,
                        direction: direction.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(fields)
    }

    /// Parse the wire form `[["age", "desc"], ["name"]]`; direction defaults to asc.
    pub fn from_json(value: &JsonValue) -> Result<Self, SortError> {
        let JsonValue::Array(items) = value else {
            return Err(SortError::Malformed("expected an array of [field, direction]".into()));
        };

        let mut fields = Vec::with_capacity(items.len());
        for item in items {
            let parts = item
                .as_array()
                .filter(|parts| (1..=2).contains(&parts.len()))
                .ok_or_else(|| SortError::Malformed(format!("bad sort entry {item}")))?;
            let name = parts[0]
                .as_str()
                .ok_or_else(|| SortError::Malformed(format!("bad field name {}", parts[0])))?;
            let direction = match parts.get(1) {
                None => Direction::Asc,
                Some(JsonValue::String(label)) => {
                    Direction::parse(label).ok_or_else(|| SortError::UnknownDirection {
                        field: name.to_string(),
                        direction: label.clone(),
                    })?
                }
                Some(other) => {
                    return Err(SortError::Malformed(format!("bad direction {other}")));
                }
            };
            fields.push(SortField::new(name, direction));
        }

        Self::new(fields)
    }

    /// Single-field descriptor. Caller guarantees a non-empty name.
    pub(crate) fn single(name: &str, direction: Direction) -> Self {
        Self {
            fields: vec![SortField::new(name, direction)],
        }
    }

    /// Primary-key order: documents by id.
    #[must_use]
    pub fn primary(direction: Direction) -> Self {
        Self::single(ID_FIELD, direction)
    }

    #[must_use]
    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn is_single_field(&self) -> bool {
        self.fields.len() == 1
    }

    /// Direction of the id order when this is the primary descriptor.
    #[must_use]
    pub fn primary_direction(&self) -> Option<Direction> {
        match self.fields.as_slice() {
            [only] if only.name == ID_FIELD => Some(only.direction),
            _ => None,
        }
    }

    #[must_use]
    pub fn covers(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }

    pub fn validate_width(&self, max: usize) -> Result<(), SortError> {
        if self.fields.len() > max {
            return Err(SortError::TooManyFields {
                found: self.fields.len(),
                max,
            });
        }

        Ok(())
    }

    /// Wire form, mirroring [`SortSpec::from_json`].
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(
            self.fields
                .iter()
                .map(|f| {
                    JsonValue::Array(vec![
                        JsonValue::String(f.name.clone()),
                        JsonValue::String(f.direction.label().to_string()),
                    ])
                })
                .collect(),
        )
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", field.name, field.direction)?;
        }

        Ok(())
    }
}

///
/// IndexId
///
/// Fixed-width identity of one sort descriptor inside the index keyspace.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IndexId([u8; 16]);

impl IndexId {
    #[must_use]
    pub fn of(sort: &SortSpec) -> Self {
        let mut canonical = Vec::new();
        for field in sort.fields() {
            push_terminated_bytes(&mut canonical, field.name().as_bytes());
            canonical.push(field.direction().to_u8());
        }

        Self(xxh3_128(&canonical))
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

///
/// IndexDef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexDef {
    sort: SortSpec,
    id: IndexId,
}

impl IndexDef {
    #[must_use]
    pub fn new(sort: SortSpec) -> Self {
        let id = IndexId::of(&sort);

        Self { sort, id }
    }

    #[must_use]
    pub const fn sort(&self) -> &SortSpec {
        &self.sort
    }

    #[must_use]
    pub const fn id(&self) -> IndexId {
        self.id
    }
}
