//! Errors raised while constructing or parsing core types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("{kind} must not be empty")]
    EmptyIdentifier { kind: &'static str },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("roster must contain at least one candidate")]
    EmptyRoster,

    #[error("candidate {0} appears more than once in the roster")]
    DuplicateCandidate(String),

    #[error("tally for candidate {0} would overflow")]
    TallyOverflow(String),
}
