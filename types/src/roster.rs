//! The fixed set of contestants for one election.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Candidate, CandidateId, TypesError};

/// One contestant as configured before the election opens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: CandidateId,
    pub name: String,
}

impl RosterEntry {
    pub fn new(id: CandidateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// The zero-tally candidate record this entry initializes.
    pub fn to_candidate(&self) -> Candidate {
        Candidate::new(self.id.clone(), self.name.clone())
    }
}

/// Ordered, non-empty list of contestants with unique ids.
///
/// Order is significant: results are reported in roster order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RosterEntry>", into = "Vec<RosterEntry>")]
pub struct Roster(Vec<RosterEntry>);

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self, TypesError> {
        if entries.is_empty() {
            return Err(TypesError::EmptyRoster);
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(TypesError::DuplicateCandidate(entry.id.to_string()));
            }
        }
        Ok(Self(entries))
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &CandidateId) -> bool {
        self.0.iter().any(|e| &e.id == id)
    }
}

impl Default for Roster {
    /// The two-ticket roster used when no configuration is supplied.
    fn default() -> Self {
        let entry = |id: &str, name: &str| RosterEntry {
            id: CandidateId(id.to_string()),
            name: name.to_string(),
        };
        Self(vec![entry("01", "Paslon Satu"), entry("02", "Paslon Dua")])
    }
}

impl TryFrom<Vec<RosterEntry>> for Roster {
    type Error = TypesError;

    fn try_from(entries: Vec<RosterEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Roster> for Vec<RosterEntry> {
    fn from(roster: Roster) -> Self {
        roster.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> RosterEntry {
        RosterEntry::new(CandidateId::new(id).unwrap(), name)
    }

    #[test]
    fn default_roster_has_two_tickets_in_order() {
        let roster = Roster::default();
        let ids: Vec<&str> = roster.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["01", "02"]);
    }

    #[test]
    fn empty_roster_is_rejected() {
        assert_eq!(Roster::new(vec![]).unwrap_err(), TypesError::EmptyRoster);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Roster::new(vec![entry("01", "A"), entry("01", "B")]).unwrap_err();
        assert_eq!(err, TypesError::DuplicateCandidate("01".into()));
    }

    #[test]
    fn deserializing_validates() {
        let bad: Result<Roster, _> =
            serde_json::from_str(r#"[{"id":"01","name":"A"},{"id":"01","name":"B"}]"#);
        assert!(bad.is_err());
    }
}
