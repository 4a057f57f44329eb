//! LMDB ledger integrity checks.
//!
//! Run on startup to detect corruption early, before the processor begins
//! accepting votes.

use std::path::Path;

use ballot_store::{LedgerStore, Revision};

use crate::{LmdbError, LmdbLedger};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub keys_checked: u64,
    pub revisions_checked: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Cross-check the `state` and `history` databases.
///
/// For every key, the history must hold versions `1..=n` without gaps and its
/// last revision must equal the current state. Problems are recorded in the
/// report rather than causing a hard error.
pub fn check_integrity(ledger: &LmdbLedger) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();

    let last_sequence = ledger.last_sequence()?;
    let current = match ledger.scan_prefix("") {
        Ok(current) => current,
        Err(e) => {
            report.errors.push(format!("failed to scan current state: {e}"));
            return Ok(report);
        }
    };

    for (key, state) in current {
        report.keys_checked += 1;
        let history: Vec<Revision> = match ledger.history(&key) {
            Ok(h) => h,
            Err(e) => {
                report.errors.push(format!("failed to read history of '{key}': {e}"));
                continue;
            }
        };
        report.revisions_checked += history.len() as u64;

        for (expected, revision) in (1u64..).zip(&history) {
            if revision.version != expected {
                report.errors.push(format!(
                    "history of '{key}' jumps to version {} where {expected} was expected",
                    revision.version
                ));
                break;
            }
            if revision.sequence > last_sequence {
                report.errors.push(format!(
                    "revision {} of '{key}' has sequence {} beyond last commit {last_sequence}",
                    revision.version, revision.sequence
                ));
            }
        }

        match history.last() {
            Some(last) if last.version == state.version && last.value == state.value => {}
            Some(last) => report.errors.push(format!(
                "state of '{key}' (version {}) disagrees with newest history revision {}",
                state.version, last.version
            )),
            None => report
                .errors
                .push(format!("state of '{key}' has no history")),
        }
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
