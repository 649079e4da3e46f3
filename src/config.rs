//! Relay configuration
//!
//! Defaults mirror the classic capped-collection chat setup: a 4096-byte
//! log, a 5-message history snapshot, and port 3000.

use std::env;
use std::net::SocketAddr;

/// Error raised when an environment override cannot be parsed. Fatal at
/// startup; the server never falls back silently on a malformed value.
#[derive(Debug)]
pub struct ConfigError {
    var: &'static str,
    value: String,
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str) -> Self {
        Self {
            var,
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value {:?} for {}", self.value, self.var)
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for the chat relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Total payload bytes the log retains before evicting oldest messages
    pub capacity_bytes: usize,
    /// Number of messages sent as the history snapshot on join
    pub history_count: usize,
    /// Per-subscriber delivery buffer, in records
    pub subscriber_buffer: usize,
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: 4096,
            history_count: 5,
            subscriber_buffer: 64,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl RelayConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log capacity in payload bytes
    pub fn with_capacity_bytes(mut self, capacity_bytes: usize) -> Self {
        self.capacity_bytes = capacity_bytes;
        self
    }

    /// Set the join-time history snapshot size
    pub fn with_history_count(mut self, history_count: usize) -> Self {
        self.history_count = history_count;
        self
    }

    /// Set the per-subscriber delivery buffer
    pub fn with_subscriber_buffer(mut self, subscriber_buffer: usize) -> Self {
        self.subscriber_buffer = subscriber_buffer;
        self
    }

    /// Set the HTTP bind address
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    /// Load configuration from the environment, keeping defaults for unset
    /// variables:
    ///
    /// - `CHAT_CAPACITY_BYTES`: log capacity in bytes
    /// - `CHAT_HISTORY_COUNT`: history snapshot size
    /// - `CHAT_SUBSCRIBER_BUFFER`: per-subscriber buffer in records
    /// - `CHAT_BIND_ADDR`: listen address, e.g. `0.0.0.0:3000`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("CHAT_CAPACITY_BYTES") {
            config.capacity_bytes = raw
                .parse()
                .map_err(|_| ConfigError::invalid("CHAT_CAPACITY_BYTES", &raw))?;
        }

        if let Ok(raw) = env::var("CHAT_HISTORY_COUNT") {
            config.history_count = raw
                .parse()
                .map_err(|_| ConfigError::invalid("CHAT_HISTORY_COUNT", &raw))?;
        }

        if let Ok(raw) = env::var("CHAT_SUBSCRIBER_BUFFER") {
            config.subscriber_buffer = raw
                .parse()
                .map_err(|_| ConfigError::invalid("CHAT_SUBSCRIBER_BUFFER", &raw))?;
        }

        if let Ok(raw) = env::var("CHAT_BIND_ADDR") {
            config.bind_addr = raw
                .parse()
                .map_err(|_| ConfigError::invalid("CHAT_BIND_ADDR", &raw))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_original_chat_setup() {
        let config = RelayConfig::default();
        assert_eq!(config.capacity_bytes, 4096);
        assert_eq!(config.history_count, 5);
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn test_builder_helpers() {
        let config = RelayConfig::new()
            .with_capacity_bytes(100)
            .with_history_count(2)
            .with_subscriber_buffer(8);

        assert_eq!(config.capacity_bytes, 100);
        assert_eq!(config.history_count, 2);
        assert_eq!(config.subscriber_buffer, 8);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("CHAT_CAPACITY_BYTES", "lots");
        assert_eq!(
            err.to_string(),
            "invalid value \"lots\" for CHAT_CAPACITY_BYTES"
        );
    }
}
