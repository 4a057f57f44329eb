//! LMDB implementation of LedgerStore.

use tracing::debug;

use ballot_store::{
    EmittedEvent, LedgerStore, Revision, StoreError, Versioned, WriteBatch,
};

use crate::environment::{
    history_key, history_prefix, EVENT_COUNT_KEY, MAX_KEY_LEN, SEQUENCE_KEY,
};
use crate::{LmdbError, LmdbLedger};

impl LedgerStore for LmdbLedger {
    fn get(&self, key: &str) -> Result<Option<Versioned>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let current = self.read_state(&rtxn, key)?;
        Ok(current.map(|rev| Versioned {
            version: rev.version,
            value: rev.value,
        }))
    }

    fn commit(&self, batch: WriteBatch) -> Result<u64, StoreError> {
        batch.validate(self.max_key_len())?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let mut found_versions = Vec::with_capacity(batch.len());
        for op in batch.ops() {
            let found = self.read_state(&wtxn, &op.key)?.map(|rev| rev.version);
            if !op.expect.admits(found) {
                // Dropping `wtxn` aborts the transaction.
                return Err(StoreError::Conflict {
                    key: op.key.clone(),
                    expected: op.expect,
                    found,
                });
            }
            found_versions.push(found);
        }

        let sequence = self.next_counter(&mut wtxn, SEQUENCE_KEY)?;
        let writes = batch.len();
        for (op, found) in batch.into_ops().into_iter().zip(found_versions) {
            let revision = Revision {
                version: found.map_or(1, |v| v + 1),
                sequence,
                value: op.value,
            };
            let bytes = bincode::serialize(&revision).map_err(LmdbError::from)?;
            self.state_db
                .put(&mut wtxn, &op.key, &bytes)
                .map_err(LmdbError::from)?;
            self.history_db
                .put(&mut wtxn, &history_key(&op.key, revision.version), &bytes)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;

        debug!(sequence, writes, "committed batch");
        Ok(sequence)
    }

    fn history(&self, key: &str) -> Result<Vec<Revision>, StoreError> {
        let prefix = history_prefix(key);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .history_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?;
        let mut revisions = Vec::new();
        for entry in iter {
            let (_hk, bytes) = entry.map_err(LmdbError::from)?;
            let revision: Revision = bincode::deserialize(bytes).map_err(|e| {
                LmdbError::Corruption(format!("history entry for key '{key}': {e}"))
            })?;
            revisions.push(revision);
        }
        Ok(revisions)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Versioned)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .state_db
            .prefix_iter(&rtxn, prefix)
            .map_err(LmdbError::from)?;
        let mut entries = Vec::new();
        for entry in iter {
            let (key, bytes) = entry.map_err(LmdbError::from)?;
            let revision: Revision = bincode::deserialize(bytes).map_err(|e| {
                LmdbError::Corruption(format!("state for key '{key}': {e}"))
            })?;
            entries.push((
                key.to_string(),
                Versioned {
                    version: revision.version,
                    value: revision.value,
                },
            ));
        }
        Ok(entries)
    }

    fn max_key_len(&self) -> usize {
        MAX_KEY_LEN
    }

    fn emit(&self, topic: &str, payload: &[u8]) -> Result<(), StoreError> {
        let event = EmittedEvent {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        };
        let bytes = bincode::serialize(&event).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let number = self.next_counter(&mut wtxn, EVENT_COUNT_KEY)?;
        self.events_db
            .put(&mut wtxn, &number.to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
