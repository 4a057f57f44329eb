//! Identifier newtypes for receipt tokens and candidates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// An externally issued receipt token authorizing exactly one vote.
///
/// The token is opaque to the ledger; the only rule is that it is not blank.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReceiptId(String);

impl ReceiptId {
    /// Create a receipt id, rejecting blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(TypesError::EmptyIdentifier { kind: "receipt id" });
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ReceiptId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ReceiptId {
    type Error = TypesError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ReceiptId> for String {
    fn from(id: ReceiptId) -> Self {
        id.0
    }
}

/// Identifier of a contestant on the roster (e.g. `"01"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CandidateId(pub(crate) String);

impl CandidateId {
    /// Create a candidate id, rejecting blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(TypesError::EmptyIdentifier {
                kind: "candidate id",
            });
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CandidateId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for CandidateId {
    type Error = TypesError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CandidateId> for String {
    fn from(id: CandidateId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_receipt_is_rejected() {
        assert_eq!(
            ReceiptId::new("   ").unwrap_err(),
            TypesError::EmptyIdentifier { kind: "receipt id" }
        );
        assert!(ReceiptId::new("").is_err());
    }

    #[test]
    fn receipt_keeps_raw_text() {
        let id = ReceiptId::new("KPPS-0042").unwrap();
        assert_eq!(id.as_str(), "KPPS-0042");
        assert_eq!(id.to_string(), "KPPS-0042");
    }

    #[test]
    fn candidate_id_rejects_blank_on_deserialize() {
        let parsed: Result<CandidateId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
        let ok: CandidateId = serde_json::from_str("\"01\"").unwrap();
        assert_eq!(ok.as_str(), "01");
    }
}
