//! WebSocket application state

use std::sync::Arc;

use crate::relay::ChatService;

/// Shared application state for WebSocket connections
pub struct AppState {
    /// The chat relay service
    pub service: Arc<ChatService>,
}

impl AppState {
    /// Create a new AppState around a running service
    pub fn new(service: Arc<ChatService>) -> Self {
        Self { service }
    }
}
