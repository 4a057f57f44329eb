//! LMDB environment setup.
//!
//! Four named databases live in one environment:
//! - `state`: key → bincode [`Revision`] holding the current value.
//! - `history`: `key_len_be_u16 ++ key ++ version_be_u64` → bincode [`Revision`].
//!   The length prefix keeps one key's history from matching another key's
//!   prefix scan; big-endian versions sort oldest first.
//! - `events`: `event_number_be_u64` → bincode [`EmittedEvent`].
//! - `meta`: counters (`sequence`, `event_count`) as little-endian u64.
//!
//! [`Revision`]: ballot_store::Revision
//! [`EmittedEvent`]: ballot_store::EmittedEvent

use std::path::{Path, PathBuf};

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::info;

use ballot_store::{EmittedEvent, Revision};

use crate::LmdbError;

const MAX_DBS: u32 = 4;
pub(crate) const SEQUENCE_KEY: &str = "sequence";
pub(crate) const EVENT_COUNT_KEY: &str = "event_count";

/// LMDB's compiled-in key limit.
const LMDB_MAX_KEY_SIZE: usize = 511;
/// Longest store key whose history key (`u16` length ++ key ++ `u64`
/// version) still fits in LMDB.
pub(crate) const MAX_KEY_LEN: usize = LMDB_MAX_KEY_SIZE - 2 - 8;

/// An LMDB-backed ledger store.
pub struct LmdbLedger {
    pub(crate) env: Env,
    pub(crate) path: PathBuf,
    pub(crate) state_db: Database<Str, Bytes>,
    pub(crate) history_db: Database<Bytes, Bytes>,
    pub(crate) events_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Str, Bytes>,
}

impl LmdbLedger {
    /// Open or create an LMDB ledger at `path` with the given map size in bytes.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per path by this process and
        // the data file is not modified by anything but LMDB.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let state_db = env.create_database(&mut wtxn, Some("state"))?;
        let history_db = env.create_database(&mut wtxn, Some("history"))?;
        let events_db = env.create_database(&mut wtxn, Some("events"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        info!(path = %path.display(), map_size, "opened LMDB ledger");
        Ok(Self {
            env,
            path: path.to_path_buf(),
            state_db,
            history_db,
            events_db,
            meta_db,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every event handed to `emit`, oldest first.
    pub fn events(&self) -> Result<Vec<EmittedEvent>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let mut events = Vec::new();
        for entry in self.events_db.iter(&rtxn)? {
            let (_number, bytes) = entry?;
            events.push(bincode::deserialize(bytes)?);
        }
        Ok(events)
    }

    /// Last commit sequence handed out, 0 for a fresh ledger.
    pub fn last_sequence(&self) -> Result<u64, LmdbError> {
        let rtxn = self.env.read_txn()?;
        self.read_counter(&rtxn, SEQUENCE_KEY)
    }

    pub(crate) fn read_state(
        &self,
        txn: &RoTxn,
        key: &str,
    ) -> Result<Option<Revision>, LmdbError> {
        match self.state_db.get(txn, key)? {
            Some(bytes) => bincode::deserialize(bytes)
                .map(Some)
                .map_err(|e| LmdbError::Corruption(format!("state for key '{key}': {e}"))),
            None => Ok(None),
        }
    }

    pub(crate) fn read_counter(&self, txn: &RoTxn, name: &str) -> Result<u64, LmdbError> {
        match self.meta_db.get(txn, name)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                    LmdbError::Corruption(format!("meta counter '{name}' has unexpected length"))
                })?;
                Ok(u64::from_le_bytes(arr))
            }
            None => Ok(0),
        }
    }

    /// Increment a meta counter inside `txn` and return the new value.
    pub(crate) fn next_counter(&self, txn: &mut RwTxn, name: &str) -> Result<u64, LmdbError> {
        let next = self.read_counter(txn, name)? + 1;
        self.meta_db.put(txn, name, &next.to_le_bytes())?;
        Ok(next)
    }
}

/// Prefix shared by every history entry of `key`.
pub(crate) fn history_prefix(key: &str) -> Vec<u8> {
    let bytes = key.as_bytes();
    let mut prefix = Vec::with_capacity(2 + bytes.len() + 8);
    prefix.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    prefix.extend_from_slice(bytes);
    prefix
}

pub(crate) fn history_key(key: &str, version: u64) -> Vec<u8> {
    let mut hk = history_prefix(key);
    hk.extend_from_slice(&version.to_be_bytes());
    hk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keys_sort_by_version() {
        assert!(history_key("vote/R1", 2) < history_key("vote/R1", 10));
        assert!(history_key("vote/R1", 255) < history_key("vote/R1", 256));
    }

    #[test]
    fn history_prefix_is_unambiguous() {
        // "ab" must not prefix-match "abc".
        let ab = history_prefix("ab");
        assert!(!history_key("abc", 1).starts_with(&ab));
        assert!(history_key("ab", 1).starts_with(&ab));
    }
}
