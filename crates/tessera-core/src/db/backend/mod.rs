//! Module: db::backend
//! Responsibility: the ordered key-value boundary the engine persists through.
//! Does not own: key layout or any document semantics.

mod batch;
mod memory;

#[cfg(test)]
mod tests;

pub use batch::{BatchOp, WriteBatch};
pub use memory::MemoryBackend;

use crate::{
    db::Direction,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use std::ops::Bound;
use thiserror::Error as ThisError;

///
/// BackendError
///

#[derive(Debug, ThisError)]
pub enum BackendError {
    #[error("backend read failed: {0}")]
    Read(String),

    #[error("backend write failed: {0}")]
    Write(String),

    #[error("backend scan failed: {0}")]
    Scan(String),
}

impl From<BackendError> for InternalError {
    fn from(err: BackendError) -> Self {
        Self::new(ErrorClass::Backend, ErrorOrigin::Store, err.to_string())
    }
}

///
/// Backend
///
/// Ordered byte-key store.
///
/// Implementations must iterate keys in lexicographic byte order and must
/// apply a committed `WriteBatch` all-or-nothing: the engine stages every
/// index, fan-out and document mutation of one logical write into a single
/// batch.
///

pub trait Backend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError>;

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), BackendError>;

    fn delete(&mut self, key: &[u8]) -> Result<(), BackendError>;

    /// Entries inside `(lower, upper)` in `direction` order, at most `limit`.
    fn scan(
        &self,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError>;

    /// Apply every op in order.
    ///
    /// The default is only atomic when the primitive writes cannot fail;
    /// durable backends should override it with a native transaction.
    fn commit(&mut self, batch: WriteBatch) -> Result<(), BackendError> {
        for op in batch {
            match op {
                BatchOp::Put { key, value } => self.put(key, value)?,
                BatchOp::Delete { key } => self.delete(&key)?,
            }
        }

        Ok(())
    }
}
