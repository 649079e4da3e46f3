//! Wire message types for the chat WebSocket

use serde::{Deserialize, Serialize};

use crate::relay::MessageRecord;

/// Messages sent by clients
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submit a chat message
    Message { text: String },

    /// Ping for heartbeat
    Ping,
}

/// Messages sent to clients
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once immediately after the connection is established
    Connected {
        /// Number of records the following history snapshot contains
        #[serde(rename = "historyCount")]
        history_count: usize,
    },

    /// History snapshot, oldest first, sent once per connection
    History { records: Vec<MessageRecord> },

    /// A broadcast chat message
    Message { record: MessageRecord },

    /// Heartbeat response
    Pong,

    /// Reported back on the submitting connection only
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_serialization() {
        let msg = ServerMessage::Message {
            record: MessageRecord {
                id: 42,
                text: "hello".to_string(),
                created_at: 1234567890,
            },
        };

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"message\""));
        assert!(json.contains("\"id\":42"));
        assert!(json.contains("createdAt"));
    }

    #[test]
    fn test_history_serialization() {
        let msg = ServerMessage::History {
            records: vec![MessageRecord {
                id: 0,
                text: "first".to_string(),
                created_at: 0,
            }],
        };

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"history\""));
        assert!(json.contains("first"));
    }

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"message","text":"hi there"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Message { text } if text == "hi there"));

        let ping: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ping, ClientMessage::Ping));
    }
}
