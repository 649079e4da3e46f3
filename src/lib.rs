//! Chat Relay Server
//!
//! A minimal real-time chat relay: clients connect over a WebSocket, submit
//! text messages, and receive a live broadcast of all messages plus recent
//! history on join. Messages are appended in arrival order into a bounded,
//! byte-capped log that is tailed continuously, so every write is
//! redistributed to all connected clients, including the writer.
//!
//! # Features
//!
//! - **Bounded log**: byte-capacity-bounded, insertion-ordered, oldest
//!   messages evicted first
//! - **Tailing without polling**: follow cursors suspend until the log
//!   signals a new append
//! - **Fan-out broadcast**: one tail-and-broadcast loop feeds every
//!   connected subscriber in append order
//! - **History on join**: the last few messages are replayed once per
//!   connection, never through the live stream
//!
//! # Modules
//!
//! - `relay`: the append-and-tail broadcast core (log, cursor, hub, service)
//! - `api`: HTTP and WebSocket endpoints (the thin connection layer)
//! - `config`: environment-driven configuration
//!
//! # Example
//!
//! ```no_run
//! use chat_relay::{ChatService, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = ChatService::start(RelayConfig::default());
//!
//!     let mut subscription = service.subscribe();
//!     let record = service.submit("hello").unwrap();
//!
//!     // The sender gets its own message back through the broadcast path
//!     let received = subscription.receiver.recv().await.unwrap();
//!     assert_eq!(received.id, record.id);
//! }
//! ```

pub mod api;
pub mod config;
pub mod relay;

// Re-export commonly used items at crate root
pub use config::RelayConfig;
pub use relay::{
    BoundedLog, BroadcastHub, ChatService, CursorHandle, FollowCursor, MessageRecord, RelayError,
    RelayResult, SubscriberId, Subscription,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
