//! WebSocket module for the chat connection layer
//!
//! Provides the WebSocket endpoint at `/ws`. Each connection subscribes to
//! the broadcast stream, receives one history snapshot, then relays frames
//! in both directions until disconnect.

pub mod events;
pub mod handler;
pub mod state;

// Re-export commonly used items
pub use events::{ClientMessage, ServerMessage};
pub use state::AppState;
