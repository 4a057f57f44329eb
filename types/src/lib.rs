//! Fundamental types for the ballot ledger.
//!
//! This crate defines the records shared across every other crate in the
//! workspace: receipt and candidate identifiers, the `Vote` and `Candidate`
//! records, the election roster, and write-time timestamps.

pub mod candidate;
pub mod error;
pub mod ids;
pub mod roster;
pub mod time;
pub mod vote;

pub use candidate::Candidate;
pub use error::TypesError;
pub use ids::{CandidateId, ReceiptId};
pub use roster::{Roster, RosterEntry};
pub use time::{Clock, SystemClock, Timestamp};
pub use vote::Vote;
