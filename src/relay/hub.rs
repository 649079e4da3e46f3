//! Broadcast hub
//!
//! Keeps the set of currently-connected subscriber sinks and relays each
//! record from the tail-and-broadcast loop to all of them. A sink that fails
//! delivery (receiver dropped, or buffer full because the client stopped
//! draining) is removed as an implicit leave; the others are unaffected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::log::MessageRecord;
use super::{RelayError, RelayResult};

/// Identifies a registered subscriber sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fan-out relay over per-subscriber delivery sinks.
pub struct BroadcastHub {
    sinks: RwLock<HashMap<SubscriberId, mpsc::Sender<MessageRecord>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    /// Create a hub with no subscribers.
    pub fn new() -> Self {
        Self {
            sinks: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a delivery sink. Forwarding of subsequent records starts
    /// immediately; there is no history replay through the hub.
    pub fn join(&self, sink: mpsc::Sender<MessageRecord>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sinks.write().insert(id, sink);
        id
    }

    /// Deregister a sink. Calling twice, or after the sink already failed
    /// delivery, is a no-op.
    pub fn leave(&self, id: SubscriberId) {
        self.sinks.write().remove(&id);
    }

    /// Deliver a record to every registered sink.
    ///
    /// Ordering within a sink matches the publish order; ordering across
    /// sinks is unspecified. Sinks that fail are removed after the pass.
    pub fn publish(&self, record: &MessageRecord) {
        let mut dropped = Vec::new();

        {
            let sinks = self.sinks.read();
            for (id, sink) in sinks.iter() {
                if Self::deliver(*id, sink, record).is_err() {
                    dropped.push(*id);
                }
            }
        }

        if !dropped.is_empty() {
            let mut sinks = self.sinks.write();
            for id in dropped {
                sinks.remove(&id);
            }
        }
    }

    /// Number of currently registered sinks.
    pub fn subscriber_count(&self) -> usize {
        self.sinks.read().len()
    }

    fn deliver(
        id: SubscriberId,
        sink: &mpsc::Sender<MessageRecord>,
        record: &MessageRecord,
    ) -> RelayResult<()> {
        sink.try_send(record.clone())
            .map_err(|_| RelayError::SinkDeliveryFailed(id))
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
