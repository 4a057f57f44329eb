//! Tally reconciliation.
//!
//! Candidate counts are a materialized aggregate over Vote records. The audit
//! recomputes them from the votes themselves and lines the two up.

use serde::Serialize;

use ballot_types::{CandidateId, ReceiptId};

/// Recorded versus recomputed count for one candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TallyLine {
    pub candidate_id: CandidateId,
    /// Count stored on the Candidate record.
    pub recorded: u64,
    /// Number of Vote records naming this candidate.
    pub recomputed: u64,
}

impl TallyLine {
    pub fn matches(&self) -> bool {
        self.recorded == self.recomputed
    }
}

/// Result of reconciling every tally against the stored votes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TallyAudit {
    /// One line per roster candidate, in roster order.
    pub lines: Vec<TallyLine>,
    /// Number of Vote records found.
    pub total_votes: u64,
    /// Votes naming a candidate that is not on the roster.
    pub orphaned_votes: Vec<ReceiptId>,
}

impl TallyAudit {
    pub fn is_consistent(&self) -> bool {
        self.orphaned_votes.is_empty() && self.lines.iter().all(TallyLine::matches)
    }

    /// Sum of all recorded counts.
    pub fn recorded_total(&self) -> u64 {
        self.lines.iter().map(|l| l.recorded).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, recorded: u64, recomputed: u64) -> TallyLine {
        TallyLine {
            candidate_id: CandidateId::new(id).unwrap(),
            recorded,
            recomputed,
        }
    }

    #[test]
    fn consistent_when_every_line_matches() {
        let audit = TallyAudit {
            lines: vec![line("01", 2, 2), line("02", 0, 0)],
            total_votes: 2,
            orphaned_votes: vec![],
        };
        assert!(audit.is_consistent());
        assert_eq!(audit.recorded_total(), 2);
    }

    #[test]
    fn mismatch_or_orphan_is_inconsistent() {
        let mismatched = TallyAudit {
            lines: vec![line("01", 3, 2)],
            total_votes: 2,
            orphaned_votes: vec![],
        };
        assert!(!mismatched.is_consistent());

        let orphaned = TallyAudit {
            lines: vec![line("01", 1, 1)],
            total_votes: 2,
            orphaned_votes: vec![ReceiptId::new("R9").unwrap()],
        };
        assert!(!orphaned.is_consistent());
    }
}
