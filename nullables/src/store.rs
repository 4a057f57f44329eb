//! Nullable ledger: a thread-safe in-memory store for testing.
//!
//! Honours the same optimistic-concurrency contract as the LMDB backend:
//! expectations are checked and writes applied under one lock. Failures can be
//! injected to exercise the processor's error paths.

use ballot_store::{
    EmittedEvent, Expect, LedgerStore, Revision, StoreError, Versioned, WriteBatch,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    keys: BTreeMap<String, Vec<Revision>>,
    sequence: u64,
    events: Vec<EmittedEvent>,
}

/// An in-memory ledger store for testing.
pub struct NullLedger {
    inner: Mutex<Inner>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_emits: AtomicBool,
    /// Number of further commits allowed before writes start failing.
    /// `u64::MAX` means unlimited.
    writes_remaining: AtomicU64,
    /// Number of upcoming commits that lose a simulated race.
    pending_conflicts: AtomicU64,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_emits: AtomicBool::new(false),
            writes_remaining: AtomicU64::new(u64::MAX),
            pending_conflicts: AtomicU64::new(0),
        }
    }

    /// Make every read (`get`, `history`, `scan_prefix`) fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every commit fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Allow `n` more commits, then fail every commit after that.
    pub fn fail_after_writes(&self, n: u64) {
        self.writes_remaining.store(n, Ordering::SeqCst);
    }

    /// Make `emit` fail.
    pub fn fail_emits(&self, fail: bool) {
        self.fail_emits.store(fail, Ordering::SeqCst);
    }

    /// Reject the next `n` commits with a conflict, as if another writer
    /// committed first. Nothing is written by a rejected commit.
    pub fn inject_conflicts(&self, n: u64) {
        self.pending_conflicts.store(n, Ordering::SeqCst);
    }

    /// Every event handed to `emit`, in order.
    pub fn emitted(&self) -> Vec<EmittedEvent> {
        self.lock().map(|inner| inner.events.clone()).unwrap_or_default()
    }

    /// Number of distinct keys ever written.
    pub fn key_count(&self) -> usize {
        self.lock().map(|inner| inner.keys.len()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("null ledger lock poisoned".to_string()))
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected read failure".to_string()));
        }
        Ok(())
    }

    fn take_write_permit(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        let permitted = self
            .writes_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                u64::MAX => Some(u64::MAX),
                0 => None,
                n => Some(n - 1),
            })
            .is_ok();
        if !permitted {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        Ok(())
    }

    fn take_injected_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn latest(revisions: &[Revision]) -> Option<Versioned> {
    revisions.last().map(|r| Versioned {
        version: r.version,
        value: r.value.clone(),
    })
}

impl LedgerStore for NullLedger {
    fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError> {
        self.check_reads()?;
        let inner = self.lock()?;
        Ok(inner.keys.get(key).and_then(|revs| latest(revs)))
    }

    fn commit(&self, batch: WriteBatch) -> Result<u64, StoreError> {
        batch.validate(self.max_key_len())?;
        let mut inner = self.lock()?;

        for op in batch.ops() {
            let current = inner
                .keys
                .get(&op.key)
                .and_then(|revs| revs.last())
                .map(|r| r.version);
            if !op.expect.admits(current) {
                return Err(StoreError::Conflict {
                    key: op.key.clone(),
                    expected: op.expect,
                    found: current,
                });
            }
        }
        if self.take_injected_conflict() {
            let first = batch.ops().first();
            return Err(StoreError::Conflict {
                key: first.map(|op| op.key.clone()).unwrap_or_default(),
                expected: first.map(|op| op.expect).unwrap_or(Expect::Any),
                found: None,
            });
        }
        self.take_write_permit()?;

        inner.sequence += 1;
        let sequence = inner.sequence;
        for op in batch.into_ops() {
            let revisions = inner.keys.entry(op.key).or_default();
            let version = revisions.last().map_or(1, |r| r.version + 1);
            revisions.push(Revision {
                version,
                sequence,
                value: op.value,
            });
        }
        Ok(sequence)
    }

    fn history(&self, key: &str) -> Result<Vec<Revision>, StoreError> {
        self.check_reads()?;
        let inner = self.lock()?;
        Ok(inner.keys.get(key).cloned().unwrap_or_default())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Versioned)>, StoreError> {
        self.check_reads()?;
        let inner = self.lock()?;
        Ok(inner
            .keys
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .filter_map(|(k, revs)| latest(revs).map(|v| (k.clone(), v)))
            .collect())
    }

    fn emit(&self, topic: &str, payload: &[u8]) -> Result<(), StoreError> {
        if self.fail_emits.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected emit failure".to_string()));
        }
        self.lock()?.events.push(EmittedEvent {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
