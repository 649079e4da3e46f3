//! Follow cursor over the bounded log
//!
//! Reproduces tailable, await-data cursor semantics: a logically infinite
//! read that suspends for new data instead of polling. A cursor is seeded at
//! the log's tail when attached, so it only ever yields records appended
//! after its own attach point, each exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

use super::log::{BoundedLog, MessageRecord};
use super::{RelayError, RelayResult};

/// Close state shared between a cursor and its handles.
struct CursorShared {
    closed: AtomicBool,
    close_notify: Notify,
}

/// Cloneable handle that closes a cursor from another task.
#[derive(Clone)]
pub struct CursorHandle {
    shared: Arc<CursorShared>,
}

impl CursorHandle {
    /// Close the cursor, promptly unblocking a suspended `next()`.
    /// Closing more than once is a no-op.
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            // notify_one stores a permit, so a next() that checks the flag
            // and then suspends still wakes up
            self.shared.close_notify.notify_one();
        }
    }

    /// Whether the cursor has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}

/// Position-tracking cursor producing the live, ordered sequence of records
/// appended after its attach point.
pub struct FollowCursor {
    log: Arc<BoundedLog>,
    tail_rx: watch::Receiver<Option<u64>>,
    /// Id of the last yielded record; `None` until the first yield when the
    /// log was empty at attach time.
    position: Option<u64>,
    shared: Arc<CursorShared>,
}

impl FollowCursor {
    /// Attach a cursor seeded at the log's current tail, so the live
    /// sequence starts with the next append. History is delivered through
    /// a separate snapshot read, never through the cursor.
    pub fn attach(log: &Arc<BoundedLog>) -> Self {
        Self {
            log: Arc::clone(log),
            tail_rx: log.watch_tail(),
            position: log.tail_position(),
            shared: Arc::new(CursorShared {
                closed: AtomicBool::new(false),
                close_notify: Notify::new(),
            }),
        }
    }

    /// Current position: the id of the last yielded record, or the seed
    /// taken at attach time.
    pub fn position(&self) -> Option<u64> {
        self.position
    }

    /// Handle for closing this cursor from another task.
    pub fn handle(&self) -> CursorHandle {
        CursorHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Close the cursor. Equivalent to `handle().close()`.
    pub fn close(&self) {
        self.handle().close();
    }

    /// Wait for the next record after the current position.
    ///
    /// Returns immediately when a qualifying record already exists, and
    /// advances the position to its id, so no record is ever yielded twice.
    /// Otherwise suspends until the log publishes a new tail position or the
    /// cursor is closed. The watch channel versions its values, so an append
    /// racing with the retained-records check cannot be lost.
    ///
    /// Returns `CursorClosed` once the cursor has been closed; every call
    /// after that is a cheap terminal no-op.
    pub async fn next(&mut self) -> RelayResult<MessageRecord> {
        loop {
            if self.shared.closed.load(Ordering::Acquire) {
                return Err(RelayError::CursorClosed);
            }

            if let Some(record) = self.log.records_after(self.position, 1).into_iter().next() {
                self.position = Some(record.id);
                return Ok(record);
            }

            tokio::select! {
                _ = self.shared.close_notify.notified() => {}
                _ = self.tail_rx.changed() => {}
            }
        }
    }
}
