use ballot_store::StoreError;
use ballot_types::{CandidateId, ReceiptId, TypesError};
use thiserror::Error;

/// How a caller should react to an [`ElectionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Deterministic rejection. Safe to show to the voter; never retry.
    Validation,
    /// The store failed; the outcome of a write is unknown. Re-query with
    /// `get_vote` before deciding whether to retry.
    Store,
    /// A concurrent write won the race. Nothing was committed; the whole
    /// call can be retried.
    Conflict,
}

#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("token already used: receipt {0} has already been cast")]
    TokenAlreadyUsed(ReceiptId),

    #[error("candidate not found: {0}")]
    CandidateNotFound(CandidateId),

    #[error("vote not found: no vote recorded for receipt {0}")]
    VoteNotFound(ReceiptId),

    #[error("election not initialized: candidate {0} has no tally record")]
    Uninitialized(CandidateId),

    #[error(transparent)]
    InvalidInput(#[from] TypesError),

    #[error("invalid key {key}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("concurrent write conflict on {key}; nothing was committed")]
    Conflict { key: String },

    #[error("store read failed: {0}")]
    StoreRead(#[source] StoreError),

    #[error("store write failed: {0}")]
    StoreWrite(#[source] StoreError),

    #[error("store write failed while initializing candidate {candidate_id}: {source}")]
    InitFailed {
        candidate_id: CandidateId,
        #[source]
        source: StoreError,
    },

    #[error("corrupt record at {key} (version {version}): {reason}")]
    CorruptRecord {
        key: String,
        version: u64,
        reason: String,
    },

    #[error("failed to encode record for {key}: {reason}")]
    Encoding { key: String, reason: String },
}

impl ElectionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TokenAlreadyUsed(_)
            | Self::CandidateNotFound(_)
            | Self::VoteNotFound(_)
            | Self::Uninitialized(_)
            | Self::InvalidInput(_)
            | Self::InvalidKey { .. } => ErrorCategory::Validation,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::StoreRead(_)
            | Self::StoreWrite(_)
            | Self::InitFailed { .. }
            | Self::CorruptRecord { .. }
            | Self::Encoding { .. } => ErrorCategory::Store,
        }
    }

    /// Only conflicts are safe to retry blindly.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Conflict
    }

    /// Map a failed commit: conflicts stay retryable, a key the store rejects
    /// outright is invalid input, everything else is a write failure of
    /// unknown outcome.
    pub(crate) fn from_commit(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { key, .. } => Self::Conflict { key },
            StoreError::InvalidKey { key, reason } => Self::InvalidKey {
                key,
                reason: reason.to_string(),
            },
            other => Self::StoreWrite(other),
        }
    }
}
