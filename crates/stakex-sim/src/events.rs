// crates/stakex-sim/src/events.rs
//
// Notification records broadcast by the shared staking handle.
//
// Every committed engine operation is published on a tokio broadcast
// channel. The event logger task (and tests) subscribe to receive them in
// commit order.

use serde::Serialize;
use tokio::sync::broadcast;

use stakex_core::{StakingEvent, Timestamp};

/// A committed notification with its position in the commit order.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    /// Monotonic sequence number, starting at 1.
    pub seq: u64,
    /// Clock time at which the operation committed.
    pub at: Timestamp,
    /// The notification itself.
    pub event: StakingEvent,
}

/// Log every record received until all senders are dropped.
pub async fn log_events(mut rx: broadcast::Receiver<EventRecord>) {
    loop {
        match rx.recv().await {
            Ok(record) => {
                tracing::debug!(
                    seq = record.seq,
                    at = record.at,
                    event = record.event.name(),
                    "{:?}",
                    record.event
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Event logger lagged, {} notifications skipped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
