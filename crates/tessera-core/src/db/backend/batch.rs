use derive_more::IntoIterator;

///
/// BatchOp
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOp {
    #[must_use]
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

///
/// WriteBatch
///
/// Ordered list of mutations committed as one unit.
///

#[derive(Clone, Debug, Default, Eq, IntoIterator, PartialEq)]
pub struct WriteBatch {
    #[into_iterator(owned, ref)]
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Put {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete { key: key.into() });
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// One-line op census, for diagnostics.
    #[must_use]
    pub fn summary(&self) -> String {
        let puts = self
            .ops
            .iter()
            .filter(|op| matches!(op, BatchOp::Put { .. }))
            .count();

        format!(
            "{} ops ({puts} put, {} delete)",
            self.ops.len(),
            self.ops.len() - puts
        )
    }
}
