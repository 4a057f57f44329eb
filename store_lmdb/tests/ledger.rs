//! Integration tests for the LMDB ledger: persistence, history ordering,
//! optimistic-concurrency conflicts and the event log.

use std::sync::Arc;
use std::thread;

use ballot_store::{Expect, LedgerStore, StoreError, WriteBatch};
use ballot_store_lmdb::{check_integrity, LmdbLedger};

const MAP_SIZE: usize = 64 * 1024 * 1024;

fn temp_ledger() -> (tempfile::TempDir, LmdbLedger) {
    let dir = tempfile::tempdir().expect("temp dir");
    let ledger = LmdbLedger::open(dir.path(), MAP_SIZE).expect("open ledger");
    (dir, ledger)
}

#[test]
fn missing_key_reads_as_none() {
    let (_dir, ledger) = temp_ledger();
    assert!(ledger.get("vote/R1").unwrap().is_none());
    assert!(!ledger.exists("vote/R1").unwrap());
    assert!(ledger.history("vote/R1").unwrap().is_empty());
}

#[test]
fn writes_bump_version_and_sequence() {
    let (_dir, ledger) = temp_ledger();
    assert_eq!(ledger.put("candidate/01", b"a").unwrap(), 1);
    assert_eq!(ledger.put("candidate/02", b"b").unwrap(), 2);
    assert_eq!(ledger.put("candidate/01", b"c").unwrap(), 3);

    let current = ledger.get("candidate/01").unwrap().unwrap();
    assert_eq!(current.version, 2);
    assert_eq!(current.value, b"c");
    assert_eq!(ledger.last_sequence().unwrap(), 3);
}

#[test]
fn history_is_complete_and_oldest_first() {
    let (_dir, ledger) = temp_ledger();
    for i in 0..300u32 {
        ledger.put("candidate/01", i.to_string().as_bytes()).unwrap();
    }
    // Neighbouring key that shares a textual prefix.
    ledger.put("candidate/010", b"other").unwrap();

    let history = ledger.history("candidate/01").unwrap();
    assert_eq!(history.len(), 300);
    for (i, rev) in history.iter().enumerate() {
        assert_eq!(rev.version, i as u64 + 1);
        assert_eq!(rev.value, i.to_string().as_bytes());
    }
    assert!(history.windows(2).all(|w| w[0].sequence < w[1].sequence));
}

#[test]
fn conflicting_batch_is_rolled_back() {
    let (_dir, ledger) = temp_ledger();
    ledger.put("candidate/01", b"0").unwrap();

    let mut batch = WriteBatch::new();
    batch
        .insert("vote/R1", b"vote".to_vec())
        .update("candidate/01", b"1".to_vec(), 5);
    let err = ledger.commit(batch).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Conflict {
            expected: Expect::Version(5),
            found: Some(1),
            ..
        }
    ));

    assert!(ledger.get("vote/R1").unwrap().is_none());
    assert!(ledger.history("vote/R1").unwrap().is_empty());
    assert_eq!(ledger.get("candidate/01").unwrap().unwrap().value, b"0");
    assert_eq!(ledger.last_sequence().unwrap(), 1);
}

#[test]
fn insert_rejects_existing_key() {
    let (_dir, ledger) = temp_ledger();
    let mut first = WriteBatch::new();
    first.insert("vote/R1", b"x".to_vec());
    ledger.commit(first).unwrap();

    let mut second = WriteBatch::new();
    second.insert("vote/R1", b"y".to_vec());
    assert!(ledger.commit(second).unwrap_err().is_conflict());
    assert_eq!(ledger.get("vote/R1").unwrap().unwrap().value, b"x");
}

#[test]
fn scan_prefix_returns_only_matching_keys() {
    let (_dir, ledger) = temp_ledger();
    ledger.put("vote/R2", b"2").unwrap();
    ledger.put("vote/R1", b"1").unwrap();
    ledger.put("candidate/01", b"c").unwrap();

    let scanned = ledger.scan_prefix("vote/").unwrap();
    let keys: Vec<&str> = scanned.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["vote/R1", "vote/R2"]);
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let ledger = LmdbLedger::open(dir.path(), MAP_SIZE).unwrap();
        ledger.put("candidate/01", b"persisted").unwrap();
        ledger.emit("VoteCast", b"hello").unwrap();
    }
    let ledger = LmdbLedger::open(dir.path(), MAP_SIZE).unwrap();
    assert_eq!(ledger.get("candidate/01").unwrap().unwrap().value, b"persisted");
    assert_eq!(ledger.history("candidate/01").unwrap().len(), 1);
    assert_eq!(ledger.events().unwrap().len(), 1);
    assert!(check_integrity(&ledger).unwrap().is_healthy());
}

#[test]
fn events_are_kept_in_emit_order() {
    let (_dir, ledger) = temp_ledger();
    for i in 0..3 {
        ledger.emit("VoteCast", format!("event {i}").as_bytes()).unwrap();
    }
    let events = ledger.events().unwrap();
    let payloads: Vec<&[u8]> = events.iter().map(|e| e.payload.as_slice()).collect();
    assert_eq!(payloads, vec![&b"event 0"[..], &b"event 1"[..], &b"event 2"[..]]);
}

#[test]
fn concurrent_versioned_increments_lose_nothing() {
    let (_dir, ledger) = temp_ledger();
    let ledger = Arc::new(ledger);
    ledger.put("counter", &0u64.to_le_bytes()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for _ in 0..25 {
                    loop {
                        let current = ledger.get("counter").unwrap().unwrap();
                        let n = u64::from_le_bytes(current.value.as_slice().try_into().unwrap());
                        let mut batch = WriteBatch::new();
                        batch.update("counter", (n + 1).to_le_bytes().to_vec(), current.version);
                        match ledger.commit(batch) {
                            Ok(_) => break,
                            Err(e) if e.is_conflict() => continue,
                            Err(e) => panic!("unexpected store error: {e}"),
                        }
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let current = ledger.get("counter").unwrap().unwrap();
    assert_eq!(u64::from_le_bytes(current.value.as_slice().try_into().unwrap()), 200);
    assert_eq!(ledger.history("counter").unwrap().len(), 201);
}

#[test]
fn keys_beyond_the_lmdb_limit_are_rejected_up_front() {
    let (_dir, ledger) = temp_ledger();
    let max = ledger.max_key_len();
    assert_eq!(max, 501);

    let longest = "k".repeat(max);
    ledger.put(&longest, b"fits").unwrap();
    assert_eq!(ledger.history(&longest).unwrap().len(), 1);

    let too_long = "k".repeat(max + 1);
    let mut batch = WriteBatch::new();
    batch.insert("vote/R1", b"v".to_vec()).insert(too_long, b"x".to_vec());
    assert!(matches!(
        ledger.commit(batch),
        Err(StoreError::InvalidKey { .. })
    ));
    assert!(ledger.get("vote/R1").unwrap().is_none());
}
