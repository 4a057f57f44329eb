//! LMDB storage backend for the ballot ledger.
//!
//! Implements [`ballot_store::LedgerStore`] using the `heed` LMDB bindings.
//! LMDB admits a single writer at a time, so every `commit` checks its
//! expectations and applies its writes inside one write transaction.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod ledger;

pub use environment::LmdbLedger;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
