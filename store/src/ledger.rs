//! The ledger store trait.

use crate::{Expect, Revision, StoreError, Versioned, WriteBatch, MAX_KEY_LEN};

/// A transactional keyed store with per-key history.
///
/// Implementations must be safe to share between threads; every method takes
/// `&self` and does its own synchronization.
pub trait LedgerStore: Send + Sync {
    /// Current value of `key`, or `None` if it has never been written.
    fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError>;

    /// Apply every write in `batch` atomically, or none of them.
    ///
    /// Returns the store-wide commit sequence assigned to the batch. Fails
    /// with [`StoreError::Conflict`] if any expectation does not hold.
    fn commit(&self, batch: WriteBatch) -> Result<u64, StoreError>;

    /// All values ever written to `key`, oldest first. Empty if unknown.
    fn history(&self, key: &str) -> Result<Vec<Revision>, StoreError>;

    /// Current values of every key starting with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Versioned)>, StoreError>;

    /// Hand a notification to the store's event sink.
    ///
    /// Delivery is at-most-once and not tied to any commit.
    fn emit(&self, topic: &str, payload: &[u8]) -> Result<(), StoreError>;

    /// Unconditionally write `key`. Returns the commit sequence.
    fn put(&self, key: &str, value: &[u8]) -> Result<u64, StoreError> {
        let mut batch = WriteBatch::new();
        batch.put(key, value.to_vec(), Expect::Any);
        self.commit(batch)
    }

    /// Longest key, in bytes, that `commit` accepts. Longer keys are
    /// rejected with [`StoreError::InvalidKey`] on every attempt.
    fn max_key_len(&self) -> usize {
        MAX_KEY_LEN
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.get(key).map(|v| v.is_some())
    }
}
