//! API module for HTTP and WebSocket endpoints
//!
//! The thin connection layer around the relay core: it owns message framing
//! and the per-connection lifecycle, and only ever calls `submit`,
//! `recent_history`, `subscribe` and `unsubscribe` on the service.

pub mod http;
pub mod websocket;
