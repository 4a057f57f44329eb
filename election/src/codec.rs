//! JSON encoding of stored records.
//!
//! Decoding also checks that a record's own id matches the key it was read
//! from; a mismatch is reported as corruption, never ignored.

use serde::de::DeserializeOwned;
use serde::Serialize;

use ballot_types::{Candidate, CandidateId, ReceiptId, Vote};

use crate::{ElectionError, RecordKey};

pub fn encode<T: Serialize>(key: &RecordKey, record: &T) -> Result<Vec<u8>, ElectionError> {
    serde_json::to_vec(record).map_err(|e| ElectionError::Encoding {
        key: key.storage_key(),
        reason: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(
    key: &RecordKey,
    version: u64,
    bytes: &[u8],
) -> Result<T, ElectionError> {
    serde_json::from_slice(bytes).map_err(|e| ElectionError::CorruptRecord {
        key: key.storage_key(),
        version,
        reason: e.to_string(),
    })
}

pub fn decode_vote(
    receipt_id: &ReceiptId,
    version: u64,
    bytes: &[u8],
) -> Result<Vote, ElectionError> {
    let key = RecordKey::Vote(receipt_id.clone());
    let vote: Vote = decode(&key, version, bytes)?;
    if &vote.receipt_id != receipt_id {
        return Err(ElectionError::CorruptRecord {
            key: key.storage_key(),
            version,
            reason: format!("record carries receipt {}", vote.receipt_id),
        });
    }
    Ok(vote)
}

pub fn decode_candidate(
    candidate_id: &CandidateId,
    version: u64,
    bytes: &[u8],
) -> Result<Candidate, ElectionError> {
    let key = RecordKey::Candidate(candidate_id.clone());
    let candidate: Candidate = decode(&key, version, bytes)?;
    if &candidate.id != candidate_id {
        return Err(ElectionError::CorruptRecord {
            key: key.storage_key(),
            version,
            reason: format!("record carries candidate id {}", candidate.id),
        });
    }
    Ok(candidate)
}
