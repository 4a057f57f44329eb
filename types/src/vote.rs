//! The per-ballot vote record.

use serde::{Deserialize, Serialize};

use crate::{CandidateId, ReceiptId, Timestamp};

/// One cast ballot, keyed by its receipt token.
///
/// Written exactly once and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub receipt_id: ReceiptId,
    pub candidate_id: CandidateId,
    /// Electoral district, recorded verbatim for downstream aggregation.
    pub region: String,
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_uses_camel_case_fields() {
        let vote = Vote {
            receipt_id: ReceiptId::new("R1").unwrap(),
            candidate_id: CandidateId::new("01").unwrap(),
            region: "east".into(),
            timestamp: Timestamp::from_unix_millis(0).unwrap(),
        };
        let json = serde_json::to_value(&vote).unwrap();
        assert_eq!(json["receiptId"], "R1");
        assert_eq!(json["candidateId"], "01");
        assert_eq!(json["region"], "east");
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00.000Z");
    }
}
