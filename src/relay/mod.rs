//! Chat relay core
//!
//! The append-and-tail broadcast engine behind the chat server:
//!
//! - `log`: bounded, insertion-ordered message log with FIFO eviction
//! - `cursor`: follow cursor that tails the log without polling
//! - `hub`: fan-out of records to per-subscriber delivery sinks
//!
//! `ChatService` composes the three and runs the single tail-and-broadcast
//! loop. Connection handling lives in `crate::api` and only ever calls
//! `submit`, `recent_history`, `subscribe` and `unsubscribe`.

mod cursor;
mod hub;
mod log;

pub use cursor::{CursorHandle, FollowCursor};
pub use hub::{BroadcastHub, SubscriberId};
pub use log::{BoundedLog, MessageRecord};

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::RelayConfig;

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors produced by the relay core
#[derive(Debug)]
pub enum RelayError {
    /// The payload alone exceeds the log capacity; nothing was appended.
    RecordTooLarge { size: usize, capacity: usize },
    /// Delivery to a subscriber sink failed; the sink is removed from the
    /// broadcast set as an implicit leave.
    SinkDeliveryFailed(SubscriberId),
    /// The cursor was closed; terminal for that cursor.
    CursorClosed,
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::RecordTooLarge { size, capacity } => {
                write!(
                    f,
                    "message of {} bytes exceeds the log capacity of {} bytes",
                    size, capacity
                )
            }
            RelayError::SinkDeliveryFailed(id) => {
                write!(f, "delivery to subscriber {} failed", id)
            }
            RelayError::CursorClosed => write!(f, "cursor is closed"),
        }
    }
}

impl std::error::Error for RelayError {}

/// A live subscription: the id used for `unsubscribe` plus the channel the
/// broadcast stream arrives on.
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: mpsc::Receiver<MessageRecord>,
}

/// Facade over the bounded log, follow cursor and broadcast hub.
///
/// `start` spawns one background task that runs a single cursor attached at
/// service start and forwards every yielded record to the hub. That loop is
/// the only log-to-broadcast path, which is why a sender receives its own
/// message back like every other subscriber.
pub struct ChatService {
    log: Arc<BoundedLog>,
    hub: Arc<BroadcastHub>,
    tail_cursor: CursorHandle,
    history_count: usize,
    subscriber_buffer: usize,
}

impl ChatService {
    /// Wire the components and spawn the tail-and-broadcast loop.
    pub fn start(config: RelayConfig) -> Arc<Self> {
        let log = Arc::new(BoundedLog::new(config.capacity_bytes));
        let hub = Arc::new(BroadcastHub::new());

        let mut cursor = FollowCursor::attach(&log);
        let tail_cursor = cursor.handle();

        let loop_hub = Arc::clone(&hub);
        tokio::spawn(async move {
            loop {
                match cursor.next().await {
                    Ok(record) => loop_hub.publish(&record),
                    // CursorClosed: shutdown, unwind cleanly
                    Err(_) => break,
                }
            }
        });

        Arc::new(Self {
            log,
            hub,
            tail_cursor,
            history_count: config.history_count,
            subscriber_buffer: config.subscriber_buffer,
        })
    }

    /// Append a message to the log.
    ///
    /// Does not publish directly: the background loop observes the append
    /// and rebroadcasts it to every live subscriber, including the sender.
    pub fn submit(&self, text: impl Into<String>) -> RelayResult<MessageRecord> {
        self.log.append(text)
    }

    /// The last `n` messages, oldest first.
    pub fn recent_history(&self, n: usize) -> Vec<MessageRecord> {
        self.log.last_records(n)
    }

    /// Number of messages a join-time history snapshot contains.
    pub fn history_count(&self) -> usize {
        self.history_count
    }

    /// Register a new subscriber and hand back its live stream.
    pub fn subscribe(&self) -> Subscription {
        let (sink, receiver) = mpsc::channel(self.subscriber_buffer);
        let id = self.hub.join(sink);
        Subscription { id, receiver }
    }

    /// Remove a subscriber from the broadcast set. Idempotent.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.hub.leave(id);
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    /// The underlying log, for direct reads.
    pub fn log(&self) -> &Arc<BoundedLog> {
        &self.log
    }

    /// Stop the tail-and-broadcast loop. Subscribers stay registered but no
    /// further records are forwarded.
    pub fn shutdown(&self) {
        self.tail_cursor.close();
    }
}

impl Drop for ChatService {
    fn drop(&mut self) {
        self.tail_cursor.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::RecordTooLarge {
            size: 5000,
            capacity: 4096,
        };
        assert_eq!(
            err.to_string(),
            "message of 5000 bytes exceeds the log capacity of 4096 bytes"
        );

        assert_eq!(RelayError::CursorClosed.to_string(), "cursor is closed");
    }
}
