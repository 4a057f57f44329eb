//! Value envelopes returned by the store.

use serde::{Deserialize, Serialize};

/// The current value of a key together with its version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned {
    /// Per-key version, 1 for the first write.
    pub version: u64,
    pub value: Vec<u8>,
}

/// One historical write to a key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Per-key version, 1 for the first write.
    pub version: u64,
    /// Store-wide commit sequence of the batch that wrote this revision.
    pub sequence: u64,
    pub value: Vec<u8>,
}

/// A notification handed to the store's event primitive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: Vec<u8>,
}
