//! Bounded message log
//!
//! Append-only, insertion-ordered store of message records, capped by the
//! cumulative payload size rather than the record count. Once an append
//! pushes the total over capacity, the oldest records are evicted until the
//! new record fits. Eviction is silent and only affects retrieval.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::{RelayError, RelayResult};

/// An immutable chat message entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Strictly increasing sequence number, assigned at append time
    pub id: u64,
    /// Message payload, opaque to the relay
    pub text: String,
    /// Unix millisecond timestamp, assigned by the log at append time
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl MessageRecord {
    /// Payload bytes counted against the log capacity
    pub fn payload_size(&self) -> usize {
        self.text.len()
    }
}

/// Records and bookkeeping guarded by one lock so readers always observe
/// a consistent snapshot of the tail.
struct LogInner {
    records: VecDeque<MessageRecord>,
    total_bytes: usize,
}

/// Append-only message log bounded by total payload size.
pub struct BoundedLog {
    capacity_bytes: usize,
    inner: RwLock<LogInner>,
    /// Next id to assign. Never reset, so ids stay strictly increasing
    /// even after the log has been evicted down to empty.
    next_id: AtomicU64,
    /// Tail position published on every successful append, observable by
    /// any number of waiting follow cursors.
    tail_tx: watch::Sender<Option<u64>>,
}

impl BoundedLog {
    /// Create an empty log holding at most `capacity_bytes` of payload.
    pub fn new(capacity_bytes: usize) -> Self {
        let (tail_tx, _) = watch::channel(None);
        Self {
            capacity_bytes,
            inner: RwLock::new(LogInner {
                records: VecDeque::new(),
                total_bytes: 0,
            }),
            next_id: AtomicU64::new(0),
            tail_tx,
        }
    }

    /// Capacity bound in payload bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Append a message at the tail.
    ///
    /// Assigns the next id and the current timestamp, then evicts from the
    /// head while the cumulative payload size exceeds capacity. Fails with
    /// `RecordTooLarge` when the payload alone cannot fit; the log is left
    /// unchanged in that case.
    pub fn append(&self, text: impl Into<String>) -> RelayResult<MessageRecord> {
        let text = text.into();
        if text.len() > self.capacity_bytes {
            return Err(RelayError::RecordTooLarge {
                size: text.len(),
                capacity: self.capacity_bytes,
            });
        }

        let mut inner = self.inner.write();
        let record = MessageRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            text,
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        inner.total_bytes += record.payload_size();
        inner.records.push_back(record.clone());

        while inner.total_bytes > self.capacity_bytes {
            match inner.records.pop_front() {
                Some(evicted) => inner.total_bytes -= evicted.payload_size(),
                None => break,
            }
        }

        // Publish the new tail while still holding the lock so concurrent
        // appends cannot publish out of order. send_replace stores the tail
        // even when no cursor is currently attached.
        self.tail_tx.send_replace(Some(record.id));

        Ok(record)
    }

    /// Id of the most recently appended record, or `None` while the log is
    /// empty. Seeds new follow cursors.
    pub fn tail_position(&self) -> Option<u64> {
        self.inner.read().records.back().map(|record| record.id)
    }

    /// Up to `limit` records with an id greater than `position`, oldest
    /// first. `None` is the before-first sentinel.
    pub fn records_after(&self, position: Option<u64>, limit: usize) -> Vec<MessageRecord> {
        let inner = self.inner.read();
        inner
            .records
            .iter()
            .filter(|record| position.map_or(true, |pos| record.id > pos))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Look up a record that is still retained.
    pub fn record_by_id(&self, id: u64) -> Option<MessageRecord> {
        let inner = self.inner.read();
        inner.records.iter().find(|record| record.id == id).cloned()
    }

    /// The most recent `n` records, oldest first. Used for the history
    /// snapshot a subscriber receives on join.
    pub fn last_records(&self, n: usize) -> Vec<MessageRecord> {
        let inner = self.inner.read();
        let skip = inner.records.len().saturating_sub(n);
        inner.records.iter().skip(skip).cloned().collect()
    }

    /// Number of records currently retained.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Whether the log currently retains no records.
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Subscribe to tail-position updates. Each append publishes the new
    /// tail, so a cursor can wait without polling and without holding the
    /// log lock.
    pub(crate) fn watch_tail(&self) -> watch::Receiver<Option<u64>> {
        self.tail_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_sequential_ids() {
        let log = BoundedLog::new(1024);

        let first = log.append("hello").unwrap();
        let second = log.append("world").unwrap();

        assert_eq!(first.id, 0);
        assert_eq!(second.id, 1);
        assert!(first.created_at > 0);
        assert_eq!(log.tail_position(), Some(1));
    }

    #[test]
    fn test_empty_log() {
        let log = BoundedLog::new(1024);

        assert_eq!(log.tail_position(), None);
        assert!(log.records_after(None, 10).is_empty());
        assert!(log.last_records(5).is_empty());
        assert!(log.record_by_id(0).is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn test_records_after_position_and_limit() {
        let log = BoundedLog::new(1024);
        for text in ["a", "b", "c", "d"] {
            log.append(text).unwrap();
        }

        let all = log.records_after(None, 10);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].text, "a");

        let after_one = log.records_after(Some(1), 10);
        assert_eq!(after_one.len(), 2);
        assert_eq!(after_one[0].text, "c");
        assert_eq!(after_one[1].text, "d");

        let limited = log.records_after(None, 2);
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[1].text, "b");
    }

    #[test]
    fn test_last_records_oldest_first() {
        let log = BoundedLog::new(1024);
        for text in ["a", "b", "c", "d"] {
            log.append(text).unwrap();
        }

        let last_two = log.last_records(2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].text, "c");
        assert_eq!(last_two[1].text, "d");

        // Asking for more than exists returns everything
        assert_eq!(log.last_records(10).len(), 4);
    }

    #[test]
    fn test_eviction_drops_oldest_when_over_capacity() {
        let log = BoundedLog::new(100);

        for _ in 0..3 {
            log.append("x".repeat(40)).unwrap();
        }

        // 120 bytes exceed the 100-byte cap, so the first record is gone
        let remaining = log.records_after(None, usize::MAX);
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].id, 1);
        assert_eq!(remaining[1].id, 2);

        let total: usize = remaining.iter().map(|r| r.payload_size()).sum();
        assert!(total <= log.capacity_bytes());
    }

    #[test]
    fn test_ids_keep_increasing_after_eviction() {
        let log = BoundedLog::new(10);

        log.append("aaaaaaaaaa").unwrap();
        log.append("bbbbbbbbbb").unwrap();
        assert_eq!(log.len(), 1);

        let third = log.append("cc").unwrap();
        assert_eq!(third.id, 2);
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let log = BoundedLog::new(10);

        let err = log.append("x".repeat(11)).unwrap_err();
        assert!(matches!(
            err,
            RelayError::RecordTooLarge {
                size: 11,
                capacity: 10
            }
        ));

        // The log is unchanged
        assert_eq!(log.tail_position(), None);
        assert!(log.is_empty());
    }

    #[test]
    fn test_record_by_id() {
        let log = BoundedLog::new(1024);
        log.append("a").unwrap();
        let wanted = log.append("b").unwrap();

        assert_eq!(log.record_by_id(wanted.id), Some(wanted));
        assert!(log.record_by_id(99).is_none());
    }
}
