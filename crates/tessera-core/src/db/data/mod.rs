//! Module: db::data
//! Responsibility: stored document rows and their size-bounded encoding.

use crate::{
    config::DEFAULT_MAX_DOCUMENT_BYTES,
    error::InternalError,
    serialize::{SerializeError, deserialize, serialize},
    value::Document,
};
use serde::{Deserialize, Serialize};

///
/// StoredRow
///
/// Primary-store value: the document together with its own id, so primary
/// scans never have to decode ids back out of keys.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(in crate::db) struct StoredRow {
    pub(in crate::db) id: String,
    pub(in crate::db) doc: Document,
}

impl StoredRow {
    pub(in crate::db) const fn new(id: String, doc: Document) -> Self {
        Self { id, doc }
    }

    /// Encode, rejecting rows above `max_bytes`.
    pub(in crate::db) fn encode(&self, max_bytes: usize) -> Result<Vec<u8>, InternalError> {
        let bytes = serialize(self)?;
        if bytes.len() > max_bytes {
            return Err(SerializeError::TooLarge {
                len: bytes.len(),
                max: max_bytes,
            }
            .into());
        }

        Ok(bytes)
    }

    /// Decode a stored row. Rows written under a larger limit stay readable.
    pub(in crate::db) fn decode(bytes: &[u8], max_bytes: usize) -> Result<Self, InternalError> {
        let row = deserialize(bytes, max_bytes.max(DEFAULT_MAX_DOCUMENT_BYTES))?;

        Ok(row)
    }
}

///
/// TESTS
///
