use thiserror::Error;

use crate::Expect;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A batch precondition no longer held at commit time. Nothing was written.
    #[error("write conflict on key {key}: expected {expected}, found version {found:?}")]
    Conflict {
        key: String,
        expected: Expect,
        found: Option<u64>,
    },

    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
