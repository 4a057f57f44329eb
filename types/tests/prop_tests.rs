use proptest::prelude::*;

use ballot_types::{Candidate, CandidateId, ReceiptId, Roster, RosterEntry, Timestamp};

// Upper bound keeps the year at four digits (9999-12-31T23:59:59.999Z).
const MAX_MILLIS: i64 = 253_402_300_799_999;

proptest! {
    /// Textual timestamps sort exactly like the instants they encode.
    #[test]
    fn timestamp_text_order_matches_instant_order(a in 0i64..MAX_MILLIS, b in 0i64..MAX_MILLIS) {
        let ta = Timestamp::from_unix_millis(a).unwrap();
        let tb = Timestamp::from_unix_millis(b).unwrap();
        prop_assert_eq!(ta.to_rfc3339().cmp(&tb.to_rfc3339()), a.cmp(&b));
    }

    /// Every rendered timestamp has the same width.
    #[test]
    fn timestamp_text_is_fixed_width(millis in 0i64..MAX_MILLIS) {
        let ts = Timestamp::from_unix_millis(millis).unwrap();
        prop_assert_eq!(ts.to_rfc3339().len(), "1970-01-01T00:00:00.000Z".len());
    }

    /// Parsing the rendered form yields the same instant.
    #[test]
    fn timestamp_parse_inverts_render(millis in 0i64..MAX_MILLIS) {
        let ts = Timestamp::from_unix_millis(millis).unwrap();
        let parsed: Timestamp = ts.to_rfc3339().parse().unwrap();
        prop_assert_eq!(parsed.as_unix_millis(), millis);
    }

    /// Any non-blank text is a valid receipt; blank text never is.
    #[test]
    fn receipt_accepts_exactly_non_blank(raw in "\\PC{0,24}") {
        prop_assert_eq!(ReceiptId::new(raw.clone()).is_ok(), !raw.trim().is_empty());
    }

    /// Incrementing k times from zero yields a count of k.
    #[test]
    fn candidate_increments_accumulate(k in 0u64..500) {
        let mut c = Candidate::new(CandidateId::new("01").unwrap(), "Paslon Satu");
        for _ in 0..k {
            c = c.with_one_more_vote().unwrap();
        }
        prop_assert_eq!(c.count, k);
    }

    /// Rosters built from distinct ids are accepted and keep their order.
    #[test]
    fn roster_preserves_order(ids in prop::collection::btree_set("[a-z0-9]{1,6}", 1..12)) {
        let entries: Vec<RosterEntry> = ids
            .iter()
            .map(|id| RosterEntry::new(CandidateId::new(id.as_str()).unwrap(), format!("name-{id}")))
            .collect();
        let roster = Roster::new(entries.clone()).unwrap();
        prop_assert_eq!(roster.entries(), entries.as_slice());
    }
}
