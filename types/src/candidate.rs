//! The per-contestant tally record.

use serde::{Deserialize, Serialize};

use crate::{CandidateId, TypesError};

/// A contestant and its running vote count.
///
/// `id` and `name` are fixed at initialization; `count` only ever grows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub count: u64,
}

impl Candidate {
    /// A fresh candidate with a zero tally.
    pub fn new(id: CandidateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            count: 0,
        }
    }

    /// The same candidate with one more vote attributed to it.
    pub fn with_one_more_vote(&self) -> Result<Self, TypesError> {
        let count = self
            .count
            .checked_add(1)
            .ok_or_else(|| TypesError::TallyOverflow(self.id.to_string()))?;
        Ok(Self {
            count,
            ..self.clone()
        })
    }
}
