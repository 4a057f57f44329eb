//! Audit history projection.
//!
//! A pure read over the store's own revision log: every stored revision is
//! decoded, in order, oldest first. An entry that fails to decode fails the
//! whole projection.

use serde::Serialize;

use ballot_store::Revision;
use ballot_types::{Candidate, Vote};

use crate::codec::{decode_candidate, decode_vote};
use crate::{ElectionError, RecordKey};

/// A decoded record of either kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Vote(Vote),
    Candidate(Candidate),
}

/// The value of a key at one point in its history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Per-key version, 1 for the first write.
    pub version: u64,
    /// Store-wide commit sequence, comparable across keys.
    pub sequence: u64,
    pub record: Record,
}

/// Decode a key's revisions, preserving their (oldest first) order.
pub fn decode_history(
    key: &RecordKey,
    revisions: Vec<Revision>,
) -> Result<Vec<HistoryEntry>, ElectionError> {
    revisions
        .into_iter()
        .map(|rev| {
            let record = match key {
                RecordKey::Vote(receipt) => {
                    Record::Vote(decode_vote(receipt, rev.version, &rev.value)?)
                }
                RecordKey::Candidate(id) => {
                    Record::Candidate(decode_candidate(id, rev.version, &rev.value)?)
                }
            };
            Ok(HistoryEntry {
                version: rev.version,
                sequence: rev.sequence,
                record,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::CandidateId;

    fn revision(version: u64, sequence: u64, candidate: &Candidate) -> Revision {
        Revision {
            version,
            sequence,
            value: serde_json::to_vec(candidate).unwrap(),
        }
    }

    #[test]
    fn keeps_order_and_tokens() {
        let id = CandidateId::new("01").unwrap();
        let zero = Candidate::new(id.clone(), "Paslon Satu");
        let one = zero.with_one_more_vote().unwrap();
        let key = RecordKey::Candidate(id);

        let entries =
            decode_history(&key, vec![revision(1, 1, &zero), revision(2, 5, &one)]).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].version, entries[0].sequence), (1, 1));
        assert_eq!(entries[1].record, Record::Candidate(one));
    }

    #[test]
    fn malformed_entry_fails_loudly() {
        let id = CandidateId::new("01").unwrap();
        let zero = Candidate::new(id.clone(), "Paslon Satu");
        let broken = Revision {
            version: 2,
            sequence: 2,
            value: b"{\"id\":".to_vec(),
        };
        let err = decode_history(&RecordKey::Candidate(id), vec![revision(1, 1, &zero), broken])
            .unwrap_err();
        assert!(matches!(err, ElectionError::CorruptRecord { version: 2, .. }));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let id = CandidateId::new("01").unwrap();
        let entry = HistoryEntry {
            version: 1,
            sequence: 1,
            record: Record::Candidate(Candidate::new(id, "Paslon Satu")),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["record"]["kind"], "candidate");
        assert_eq!(json["record"]["count"], 0);
    }
}
