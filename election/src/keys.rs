//! Persisted key layout.
//!
//! Candidates live under `candidate/<id>` and votes under `vote/<receipt>`,
//! so the candidate and receipt id spaces can never collide.

use std::fmt;
use std::str::FromStr;

use ballot_types::{CandidateId, ReceiptId, TypesError};
use thiserror::Error;

pub const CANDIDATE_PREFIX: &str = "candidate/";
pub const VOTE_PREFIX: &str = "vote/";

#[derive(Debug, Error)]
pub enum KeyParseError {
    #[error("unknown record namespace in '{0}', expected vote/ or candidate/")]
    UnknownNamespace(String),

    #[error(transparent)]
    Invalid(#[from] TypesError),
}

/// Address of one record in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Vote(ReceiptId),
    Candidate(CandidateId),
}

impl RecordKey {
    /// The key under which the record is stored.
    pub fn storage_key(&self) -> String {
        match self {
            Self::Vote(id) => format!("{VOTE_PREFIX}{id}"),
            Self::Candidate(id) => format!("{CANDIDATE_PREFIX}{id}"),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

impl FromStr for RecordKey {
    type Err = KeyParseError;

    /// Parse a storage key such as `vote/R1` or `candidate/01`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(receipt) = s.strip_prefix(VOTE_PREFIX) {
            return Ok(Self::Vote(ReceiptId::new(receipt)?));
        }
        if let Some(candidate) = s.strip_prefix(CANDIDATE_PREFIX) {
            return Ok(Self::Candidate(CandidateId::new(candidate)?));
        }
        Err(KeyParseError::UnknownNamespace(s.to_string()))
    }
}
