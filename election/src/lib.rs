//! Election transaction processor for the ballot ledger.
//!
//! Records each vote exactly once per receipt token, keeps a live
//! per-candidate tally, and reconstructs the history of any record for audit.
//!
//! Every state change goes through a [`ballot_store::LedgerStore`]. A vote is
//! committed as one conditional batch (vote insert + tally update at the read
//! version), so a failed or conflicting cast leaves no partial effect.
//! Conflicts are retried from scratch; store failures never are.

pub mod audit;
pub mod codec;
pub mod config;
pub mod error;
pub mod history;
pub mod keys;
pub mod notify;
pub mod processor;

pub use audit::{TallyAudit, TallyLine};
pub use config::{ConfigError, ElectionConfig};
pub use error::{ElectionError, ErrorCategory};
pub use history::{HistoryEntry, Record};
pub use keys::{KeyParseError, RecordKey};
pub use notify::{Notifier, VoteCastEvent, VOTE_CAST_TOPIC};
pub use processor::ElectionProcessor;
