//! Module: db::query
//! Responsibility: range options, cursor validation and scan-bound derivation.
//! Does not own: backend iteration or document loading (see `db`).

mod cursor;

#[cfg(test)]
mod tests;

pub(in crate::db) use cursor::range_bounds;

use crate::{
    db::index::IndexDef,
    error::{ErrorClass, ErrorOrigin, InternalError},
    value::Document,
};
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;

///
/// CursorError
///

#[derive(Debug, ThisError)]
pub enum CursorError {
    #[error("cursor field '{field}' is not part of the sort")]
    UnknownField { field: String },

    #[error("cursor must name a prefix of the sort fields; '{missing}' is missing")]
    NotAPrefix { missing: String },

    #[error("cursor '__id__' requires every sort field to be present")]
    IdWithoutFullTuple,

    #[error("cursor '__id__' must be a string")]
    IdNotText,

    #[error("only one of {0} may be given")]
    Conflicting(&'static str),

    #[error("cursor bounds are not supported by {0}")]
    Unsupported(&'static str),

    #[error("malformed range options: {0}")]
    Malformed(String),
}

impl From<CursorError> for InternalError {
    fn from(err: CursorError) -> Self {
        match err {
            CursorError::Unsupported(_) => {
                Self::new(ErrorClass::Unsupported, ErrorOrigin::Query, err.to_string())
            }
            _ => Self::validation(ErrorOrigin::Query, err.to_string()),
        }
    }
}

///
/// RangeOptions
///
/// Cursor documents name sort fields (and optionally `__id__`) with the
/// values to position at; they are matched against the index's own key
/// encoding, so a partial prefix bounds every entry sharing it.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RangeOptions {
    pub reverse: bool,
    pub limit: Option<usize>,
    pub start_at: Option<Document>,
    pub start_after: Option<Document>,
    pub end_at: Option<Document>,
    pub end_before: Option<Document>,
}

impl RangeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn start_at(mut self, cursor: Document) -> Self {
        self.start_at = Some(cursor);
        self
    }

    #[must_use]
    pub fn start_after(mut self, cursor: Document) -> Self {
        self.start_after = Some(cursor);
        self
    }

    #[must_use]
    pub fn end_at(mut self, cursor: Document) -> Self {
        self.end_at = Some(cursor);
        self
    }

    #[must_use]
    pub fn end_before(mut self, cursor: Document) -> Self {
        self.end_before = Some(cursor);
        self
    }

    #[must_use]
    pub const fn has_cursor(&self) -> bool {
        self.start_at.is_some()
            || self.start_after.is_some()
            || self.end_at.is_some()
            || self.end_before.is_some()
    }

    /// Parse the wire form, e.g. `{"reverse": true, "limit": 2, "startAt": {"age": 3}}`.
    pub fn from_json(value: &JsonValue) -> Result<Self, CursorError> {
        let JsonValue::Object(map) = value else {
            return Err(CursorError::Malformed("expected an object".to_string()));
        };

        let cursor = |value: &JsonValue| {
            Document::from_json(value).map_err(|err| CursorError::Malformed(err.to_string()))
        };

        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "reverse" => {
                    options.reverse = value
                        .as_bool()
                        .ok_or_else(|| CursorError::Malformed("reverse must be a bool".into()))?;
                }
                "limit" => {
                    let limit = value
                        .as_u64()
                        .and_then(|v| usize::try_from(v).ok())
                        .ok_or_else(|| CursorError::Malformed("limit must be a count".into()))?;
                    options.limit = Some(limit);
                }
                "startAt" => options.start_at = Some(cursor(value)?),
                "startAfter" => options.start_after = Some(cursor(value)?),
                "endAt" => options.end_at = Some(cursor(value)?),
                "endBefore" => options.end_before = Some(cursor(value)?),
                other => {
                    return Err(CursorError::Malformed(format!("unknown option '{other}'")));
                }
            }
        }

        Ok(options)
    }
}

///
/// Access
///
/// Key stream a range reads from.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(in crate::db) enum Access {
    /// Primary store in id order; `descending` flips iteration.
    Primary { descending: bool },
    Index(IndexDef),
}

///
/// Entry
///
/// One range result: document id and stored value.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub key: String,
    pub val: Document,
}
