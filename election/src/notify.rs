//! Vote-cast notifications.
//!
//! After a vote commits, the processor publishes a [`VoteCastEvent`] onto a
//! bounded broadcast queue and returns; it never waits for listeners. A
//! relay task drains the queue into the store's `emit` primitive. Delivery is
//! at-most-once: a lagging listener or a failing `emit` loses notifications,
//! and neither can affect a committed vote.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ballot_store::LedgerStore;
use ballot_types::{CandidateId, Timestamp};

/// Topic under which vote notifications are emitted to the store.
pub const VOTE_CAST_TOPIC: &str = "VoteCast";

/// Published once per committed vote. Carries no receipt token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCastEvent {
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub region: String,
    pub timestamp: Timestamp,
    /// Commit sequence of the batch that recorded the vote.
    pub sequence: u64,
}

impl VoteCastEvent {
    /// Human-readable one-liner for dashboards.
    pub fn summary(&self) -> String {
        format!(
            "vote cast for {} from region {}",
            self.candidate_name, self.region
        )
    }
}

/// Outbound notification queue.
pub struct Notifier {
    tx: broadcast::Sender<VoteCastEvent>,
}

impl Notifier {
    /// Create a queue holding at most `capacity` undelivered events per listener.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Listen for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<VoteCastEvent> {
        self.tx.subscribe()
    }

    /// Hand an event to every current listener. Returns how many there were.
    pub fn publish(&self, event: VoteCastEvent) -> usize {
        match self.tx.send(event) {
            Ok(listeners) => listeners,
            Err(_) => {
                debug!("vote notification dropped: no listeners");
                0
            }
        }
    }

    /// Forward every event published from now on to `store.emit`.
    ///
    /// Must be called inside a tokio runtime. Each `emit` runs on the blocking
    /// pool, so a store waiting on its write lock never stalls the runtime.
    /// The task ends once the notifier is dropped and the queue is drained;
    /// it yields the number of events the store accepted, in publish order.
    pub fn spawn_relay<S>(&self, store: Arc<S>) -> JoinHandle<u64>
    where
        S: LedgerStore + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            let mut forwarded = 0u64;
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        let sequence = event.sequence;
                        let payload = event.summary();
                        let store = store.clone();
                        // `emit` is a blocking store write.
                        let emitted = tokio::task::spawn_blocking(move || {
                            store.emit(VOTE_CAST_TOPIC, payload.as_bytes())
                        })
                        .await;
                        match emitted {
                            Ok(Ok(())) => forwarded += 1,
                            Ok(Err(e)) => {
                                warn!(sequence, "failed to emit vote notification: {e}")
                            }
                            Err(e) => warn!(sequence, "vote notification emitter panicked: {e}"),
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "notification relay lagged; notifications dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!(forwarded, "notification relay stopped");
            forwarded
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(region: &str) -> VoteCastEvent {
        VoteCastEvent {
            candidate_id: CandidateId::new("01").unwrap(),
            candidate_name: "Paslon Satu".into(),
            region: region.into(),
            timestamp: Timestamp::from_unix_millis(0).unwrap(),
            sequence: 1,
        }
    }

    #[test]
    fn summary_names_candidate_and_region() {
        assert_eq!(
            event("Jawa Barat").summary(),
            "vote cast for Paslon Satu from region Jawa Barat"
        );
    }

    #[test]
    fn publish_without_listeners_is_harmless() {
        let notifier = Notifier::new(4);
        assert_eq!(notifier.publish(event("north")), 0);
    }

    #[test]
    fn subscribers_receive_published_events() {
        let notifier = Notifier::new(4);
        let mut rx = notifier.subscribe();
        assert_eq!(notifier.publish(event("north")), 1);
        assert_eq!(rx.try_recv().unwrap().region, "north");
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let notifier = Notifier::new(0);
        let mut rx = notifier.subscribe();
        notifier.publish(event("south"));
        assert!(rx.try_recv().is_ok());
    }
}
