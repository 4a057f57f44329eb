//! Nullable clock: deterministic time for testing.

use ballot_types::{Clock, Timestamp};
use std::sync::atomic::{AtomicI64, Ordering};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Safe to share between threads.
pub struct NullClock {
    current_millis: AtomicI64,
}

impl NullClock {
    pub fn new(initial_millis: i64) -> Self {
        Self {
            current_millis: AtomicI64::new(initial_millis),
        }
    }

    /// Advance time by a number of milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        self.current_millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Advance time by a number of seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.advance_millis(secs * 1000);
    }

    /// Set the time to a specific value.
    pub fn set(&self, millis: i64) {
        self.current_millis.store(millis, Ordering::SeqCst);
    }
}

impl Default for NullClock {
    /// 2024-02-14T00:00:00.000Z.
    fn default() -> Self {
        Self::new(1_707_868_800_000)
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        let millis = self.current_millis.load(Ordering::SeqCst);
        Timestamp::from_unix_millis(millis).unwrap_or_else(|| {
            Timestamp::from_unix_millis(0).expect("epoch is representable")
        })
    }
}
