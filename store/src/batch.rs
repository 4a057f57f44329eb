//! Conditional write batches.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::{validate_key, StoreError};

/// What a write expects to find at its key when the batch commits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expect {
    /// Unconditional overwrite.
    Any,
    /// The key must never have been written.
    Absent,
    /// The key must still be at exactly this version.
    Version(u64),
}

impl Expect {
    /// Whether a key currently at `current` satisfies this expectation.
    pub fn admits(&self, current: Option<u64>) -> bool {
        match self {
            Self::Any => true,
            Self::Absent => current.is_none(),
            Self::Version(v) => current == Some(*v),
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any version"),
            Self::Absent => f.write_str("absent"),
            Self::Version(v) => write!(f, "version {v}"),
        }
    }
}

/// A single write inside a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOp {
    pub key: String,
    pub value: Vec<u8>,
    pub expect: Expect,
}

/// A set of writes applied all-or-nothing.
///
/// A key may appear at most once per batch.
#[derive(Clone, Debug, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a write with an explicit expectation.
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>, expect: Expect) -> &mut Self {
        self.ops.push(WriteOp {
            key: key.into(),
            value,
            expect,
        });
        self
    }

    /// Add a write that only succeeds if the key has never been written.
    pub fn insert(&mut self, key: impl Into<String>, value: Vec<u8>) -> &mut Self {
        self.put(key, value, Expect::Absent)
    }

    /// Add a write that only succeeds if the key is still at `version`.
    pub fn update(&mut self, key: impl Into<String>, value: Vec<u8>, version: u64) -> &mut Self {
        self.put(key, value, Expect::Version(version))
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Check key shape and uniqueness before a backend applies the batch.
    pub fn validate(&self, max_key_len: usize) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(self.ops.len());
        for op in &self.ops {
            validate_key(&op.key, max_key_len)?;
            if !seen.insert(op.key.as_str()) {
                return Err(StoreError::InvalidKey {
                    key: op.key.clone(),
                    reason: "key appears more than once in the batch",
                });
            }
        }
        Ok(())
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_KEY_LEN;

    #[test]
    fn expectations_admit_correct_versions() {
        assert!(Expect::Any.admits(None));
        assert!(Expect::Any.admits(Some(7)));
        assert!(Expect::Absent.admits(None));
        assert!(!Expect::Absent.admits(Some(1)));
        assert!(Expect::Version(3).admits(Some(3)));
        assert!(!Expect::Version(3).admits(Some(4)));
        assert!(!Expect::Version(3).admits(None));
    }

    #[test]
    fn builder_keeps_insertion_order() {
        let mut batch = WriteBatch::new();
        batch.insert("vote/R1", b"v".to_vec()).update("candidate/01", b"c".to_vec(), 2);
        let keys: Vec<&str> = batch.ops().iter().map(|op| op.key.as_str()).collect();
        assert_eq!(keys, vec!["vote/R1", "candidate/01"]);
        assert_eq!(batch.ops()[1].expect, Expect::Version(2));
    }

    #[test]
    fn duplicate_keys_fail_validation() {
        let mut batch = WriteBatch::new();
        batch.insert("k", vec![]).put("k", vec![], Expect::Any);
        assert!(matches!(
            batch.validate(MAX_KEY_LEN),
            Err(StoreError::InvalidKey { key, .. }) if key == "k"
        ));
    }

    #[test]
    fn empty_key_fails_validation() {
        let mut batch = WriteBatch::new();
        batch.insert("", vec![1]);
        assert!(batch.validate(MAX_KEY_LEN).is_err());
    }

    #[test]
    fn keys_over_the_backend_limit_fail_validation() {
        let mut batch = WriteBatch::new();
        batch.insert("vote/R1", vec![1]);
        assert!(batch.validate(7).is_ok());
        assert!(matches!(
            batch.validate(6),
            Err(StoreError::InvalidKey { key, .. }) if key == "vote/R1"
        ));
    }
}
