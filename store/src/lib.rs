//! Abstract ledger store interface for the ballot ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements
//! [`LedgerStore`]. The election processor depends only on the trait.
//!
//! Concurrency contract: optimistic. Each key carries a version that starts at
//! 1 and grows by one per write. A [`WriteBatch`] is applied atomically and
//! only if every operation's [`Expect`] still holds at commit time; otherwise
//! the whole batch is rejected with [`StoreError::Conflict`].

pub mod batch;
pub mod error;
pub mod ledger;
pub mod revision;

pub use batch::{Expect, WriteBatch, WriteOp};
pub use error::StoreError;
pub use ledger::LedgerStore;
pub use revision::{EmittedEvent, Revision, Versioned};

/// Longest key any backend accepts. Backends may lower it through
/// [`LedgerStore::max_key_len`].
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

/// Reject keys a backend cannot store unambiguously.
pub fn validate_key(key: &str, max_len: usize) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: "key is empty",
        });
    }
    if key.len() > max_len.min(MAX_KEY_LEN) {
        return Err(StoreError::InvalidKey {
            key: key.chars().take(32).collect(),
            reason: "key is longer than the store allows",
        });
    }
    Ok(())
}
