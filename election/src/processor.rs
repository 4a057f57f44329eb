//! The election transaction processor.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, info, warn};

use ballot_store::{LedgerStore, StoreError, WriteBatch};
use ballot_types::{Candidate, CandidateId, Clock, ReceiptId, Roster, SystemClock, Vote};
use ballot_utils::StatsCounter;

use crate::audit::{TallyAudit, TallyLine};
use crate::codec::{decode_candidate, decode_vote, encode};
use crate::history::{decode_history, HistoryEntry};
use crate::keys::VOTE_PREFIX;
use crate::notify::{Notifier, VoteCastEvent};
use crate::{ElectionConfig, ElectionError, ErrorCategory, RecordKey};

const STAT_ACCEPTED: &str = "votes_accepted";
const STAT_DUPLICATE: &str = "duplicate_receipts";
const STAT_UNKNOWN_CANDIDATE: &str = "unknown_candidates";
const STAT_CONFLICT_RETRIES: &str = "conflict_retries";
const STAT_CONFLICTS_SURFACED: &str = "conflicts_surfaced";
const STAT_STORE_FAILURES: &str = "store_failures";

/// Validates and applies election transactions against a ledger store.
///
/// All operations take `&self`; share one processor between threads with
/// `Arc`. The processor holds no locks of its own and relies on the store's
/// conditional commits for isolation.
pub struct ElectionProcessor<S: LedgerStore, C: Clock = SystemClock> {
    store: Arc<S>,
    clock: C,
    roster: Roster,
    notifier: Notifier,
    stats: StatsCounter,
    max_conflict_retries: u32,
}

impl<S: LedgerStore> ElectionProcessor<S, SystemClock> {
    pub fn new(store: Arc<S>, config: ElectionConfig) -> Self {
        Self::with_clock(store, config, SystemClock)
    }
}

impl<S: LedgerStore, C: Clock> ElectionProcessor<S, C> {
    pub fn with_clock(store: Arc<S>, config: ElectionConfig, clock: C) -> Self {
        Self {
            store,
            clock,
            roster: config.roster,
            notifier: Notifier::new(config.notification_capacity),
            stats: StatsCounter::new(&[
                STAT_ACCEPTED,
                STAT_DUPLICATE,
                STAT_UNKNOWN_CANDIDATE,
                STAT_CONFLICT_RETRIES,
                STAT_CONFLICTS_SURFACED,
                STAT_STORE_FAILURES,
            ]),
            max_conflict_retries: config.max_conflict_retries,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn stats(&self) -> BTreeMap<&'static str, u64> {
        self.stats.snapshot()
    }

    /// Write a zero-tally Candidate record for every roster entry, in order.
    ///
    /// Destructive when run after voting has begun: existing tallies are reset.
    /// Guarding against that is the caller's job; the overwrite is logged.
    /// Stops at the first failure; candidates already written stay written.
    pub fn init_election(&self) -> Result<(), ElectionError> {
        for entry in self.roster.iter() {
            let key = RecordKey::Candidate(entry.id.clone());
            let storage_key = key.storage_key();
            let init_failed = |source: StoreError| ElectionError::InitFailed {
                candidate_id: entry.id.clone(),
                source,
            };

            if let Some(existing) = self.store.get(&storage_key).map_err(init_failed)? {
                warn!(
                    candidate = %entry.id,
                    version = existing.version,
                    "re-initializing candidate; its tally is reset to zero"
                );
            }
            let bytes = encode(&key, &entry.to_candidate())?;
            if let Err(e) = self.store.put(&storage_key, &bytes) {
                self.stats.increment(STAT_STORE_FAILURES);
                warn!(candidate = %entry.id, "candidate initialization failed: {e}");
                return Err(init_failed(e));
            }
            debug!(candidate = %entry.id, name = %entry.name, "candidate initialized");
        }
        info!(candidates = self.roster.len(), "election initialized");
        Ok(())
    }

    /// Record one vote and attribute it to `candidate_id`.
    ///
    /// Checks, in order: identifiers are non-blank, the receipt is unused, the
    /// candidate exists. The vote and the tally increment are committed as one
    /// conditional batch. If a concurrent write invalidates what was read, the
    /// whole call is re-run from the checks, up to the configured limit.
    pub fn cast_vote(
        &self,
        receipt_id: &str,
        candidate_id: &str,
        region: &str,
    ) -> Result<Vote, ElectionError> {
        let receipt_id = ReceiptId::new(receipt_id)?;
        let candidate_id = CandidateId::new(candidate_id)?;
        self.checked_storage_key(&RecordKey::Vote(receipt_id.clone()))?;
        self.checked_storage_key(&RecordKey::Candidate(candidate_id.clone()))?;

        let mut retries = 0;
        loop {
            match self.try_cast(&receipt_id, &candidate_id, region) {
                Err(ElectionError::Conflict { key }) if retries < self.max_conflict_retries => {
                    retries += 1;
                    self.stats.increment(STAT_CONFLICT_RETRIES);
                    warn!(receipt = %receipt_id, %key, retries, "write conflict; re-running vote");
                }
                result => {
                    self.record_outcome(&receipt_id, &result);
                    return result;
                }
            }
        }
    }

    fn try_cast(
        &self,
        receipt_id: &ReceiptId,
        candidate_id: &CandidateId,
        region: &str,
    ) -> Result<Vote, ElectionError> {
        let vote_key = RecordKey::Vote(receipt_id.clone());
        if self
            .store
            .get(&vote_key.storage_key())
            .map_err(ElectionError::StoreRead)?
            .is_some()
        {
            return Err(ElectionError::TokenAlreadyUsed(receipt_id.clone()));
        }

        let candidate_key = RecordKey::Candidate(candidate_id.clone());
        let stored = self
            .store
            .get(&candidate_key.storage_key())
            .map_err(ElectionError::StoreRead)?
            .ok_or_else(|| ElectionError::CandidateNotFound(candidate_id.clone()))?;
        let candidate = decode_candidate(candidate_id, stored.version, &stored.value)?;
        let updated = candidate.with_one_more_vote()?;

        let vote = Vote {
            receipt_id: receipt_id.clone(),
            candidate_id: candidate_id.clone(),
            region: region.to_string(),
            timestamp: self.clock.now(),
        };

        let mut batch = WriteBatch::new();
        batch
            .insert(vote_key.storage_key(), encode(&vote_key, &vote)?)
            .update(
                candidate_key.storage_key(),
                encode(&candidate_key, &updated)?,
                stored.version,
            );
        let sequence = self.store.commit(batch).map_err(ElectionError::from_commit)?;

        self.notifier.publish(VoteCastEvent {
            candidate_id: candidate_id.clone(),
            candidate_name: updated.name.clone(),
            region: vote.region.clone(),
            timestamp: vote.timestamp,
            sequence,
        });
        info!(
            receipt = %receipt_id,
            candidate = %candidate_id,
            region = %vote.region,
            tally = updated.count,
            sequence,
            "vote recorded"
        );
        Ok(vote)
    }

    fn record_outcome(&self, receipt_id: &ReceiptId, result: &Result<Vote, ElectionError>) {
        let err = match result {
            Ok(_) => {
                self.stats.increment(STAT_ACCEPTED);
                return;
            }
            Err(err) => err,
        };
        match (err, err.category()) {
            (ElectionError::TokenAlreadyUsed(_), _) => self.stats.increment(STAT_DUPLICATE),
            (ElectionError::CandidateNotFound(_), _) => {
                self.stats.increment(STAT_UNKNOWN_CANDIDATE)
            }
            (_, ErrorCategory::Conflict) => self.stats.increment(STAT_CONFLICTS_SURFACED),
            (_, ErrorCategory::Store) => self.stats.increment(STAT_STORE_FAILURES),
            _ => {}
        }
        match err.category() {
            ErrorCategory::Validation => debug!(receipt = %receipt_id, "vote rejected: {err}"),
            _ => warn!(receipt = %receipt_id, "vote failed: {err}"),
        }
    }

    /// Storage key for `key`, or `InvalidKey` if the store could never hold it.
    fn checked_storage_key(&self, key: &RecordKey) -> Result<String, ElectionError> {
        let storage_key = key.storage_key();
        let max = self.store.max_key_len();
        if storage_key.len() > max {
            return Err(ElectionError::InvalidKey {
                key: storage_key.chars().take(40).collect(),
                reason: format!("{} bytes exceeds the store limit of {max}", storage_key.len()),
            });
        }
        Ok(storage_key)
    }

    /// Look up the vote recorded for `receipt_id`.
    pub fn get_vote(&self, receipt_id: &str) -> Result<Vote, ElectionError> {
        let receipt_id = ReceiptId::new(receipt_id)?;
        let key = RecordKey::Vote(receipt_id.clone());
        let storage_key = self.checked_storage_key(&key)?;
        debug!(%key, "reading vote");
        match self
            .store
            .get(&storage_key)
            .map_err(ElectionError::StoreRead)?
        {
            Some(stored) => decode_vote(&receipt_id, stored.version, &stored.value),
            None => Err(ElectionError::VoteNotFound(receipt_id)),
        }
    }

    /// Current tallies for the whole roster, in roster order.
    ///
    /// Fails with [`ElectionError::Uninitialized`] naming the first roster
    /// candidate that has no record. Equal counts are reported as-is.
    pub fn get_results(&self) -> Result<Vec<Candidate>, ElectionError> {
        self.roster
            .iter()
            .map(|entry| {
                let key = RecordKey::Candidate(entry.id.clone());
                match self
                    .store
                    .get(&key.storage_key())
                    .map_err(ElectionError::StoreRead)?
                {
                    Some(stored) => decode_candidate(&entry.id, stored.version, &stored.value),
                    None => Err(ElectionError::Uninitialized(entry.id.clone())),
                }
            })
            .collect()
    }

    /// Every version ever written to `key`, oldest first.
    pub fn get_history(&self, key: &RecordKey) -> Result<Vec<HistoryEntry>, ElectionError> {
        let storage_key = self.checked_storage_key(key)?;
        debug!(%key, "reading history");
        let revisions = self
            .store
            .history(&storage_key)
            .map_err(ElectionError::StoreRead)?;
        decode_history(key, revisions)
    }

    /// Recompute every tally from the stored votes and compare.
    ///
    /// Reads tallies and votes separately, so run it while no votes are being
    /// cast to get an exact comparison.
    pub fn audit_tally(&self) -> Result<TallyAudit, ElectionError> {
        let results = self.get_results()?;
        let votes = self
            .store
            .scan_prefix(VOTE_PREFIX)
            .map_err(ElectionError::StoreRead)?;

        let mut recomputed: HashMap<CandidateId, u64> = HashMap::new();
        let mut orphaned_votes = Vec::new();
        let total_votes = votes.len() as u64;
        for (storage_key, stored) in votes {
            let receipt_id = match storage_key.parse::<RecordKey>() {
                Ok(RecordKey::Vote(receipt_id)) => receipt_id,
                _ => {
                    return Err(ElectionError::CorruptRecord {
                        key: storage_key,
                        version: stored.version,
                        reason: "not a vote key".to_string(),
                    })
                }
            };
            let vote = decode_vote(&receipt_id, stored.version, &stored.value)?;
            if self.roster.contains(&vote.candidate_id) {
                *recomputed.entry(vote.candidate_id).or_default() += 1;
            } else {
                orphaned_votes.push(receipt_id);
            }
        }

        let lines = results
            .into_iter()
            .map(|candidate| TallyLine {
                recomputed: recomputed.get(&candidate.id).copied().unwrap_or(0),
                recorded: candidate.count,
                candidate_id: candidate.id,
            })
            .collect();
        let audit = TallyAudit {
            lines,
            total_votes,
            orphaned_votes,
        };
        if audit.is_consistent() {
            info!(total_votes, "tally audit consistent");
        } else {
            warn!(total_votes, "tally audit found discrepancies");
        }
        Ok(audit)
    }
}
