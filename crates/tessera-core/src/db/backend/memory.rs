use crate::db::{
    Direction,
    backend::{Backend, BackendError, BatchOp, WriteBatch},
    key::envelope_is_empty,
};
use std::{collections::BTreeMap, ops::Bound};

///
/// MemoryBackend
///
/// In-process ordered store. Writes cannot fail, so `commit` is trivially
/// atomic.
///

#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryBackend {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Every stored entry in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.map.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

fn owned(bound: Bound<&[u8]>) -> Bound<Vec<u8>> {
    bound.map(<[u8]>::to_vec)
}

impl Backend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.map.get(key).cloned())
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<(), BackendError> {
        self.map.insert(key, value);

        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), BackendError> {
        self.map.remove(key);

        Ok(())
    }

    fn scan(
        &self,
        lower: Bound<&[u8]>,
        upper: Bound<&[u8]>,
        direction: Direction,
        limit: Option<usize>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, BackendError> {
        // BTreeMap::range panics on inverted or empty-exclusive envelopes.
        if envelope_is_empty(&owned(lower), &owned(upper)) {
            return Ok(Vec::new());
        }

        let range = self.map.range::<[u8], _>((lower, upper));
        let take = limit.unwrap_or(usize::MAX);
        let rows = match direction {
            Direction::Asc => range
                .take(take)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Direction::Desc => range
                .rev()
                .take(take)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };

        Ok(rows)
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<(), BackendError> {
        for op in batch {
            match op {
                BatchOp::Put { key, value } => {
                    self.map.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    self.map.remove(&key);
                }
            }
        }

        Ok(())
    }
}
