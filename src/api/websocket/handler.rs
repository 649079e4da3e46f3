//! WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use super::events::{ClientMessage, ServerMessage};
use super::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
///
/// On connect: subscribe, send the welcome frame and one history snapshot.
/// Then relay in both directions until disconnect, at which point the
/// subscription is removed.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = state.service.subscribe();
    println!("User connected");

    let history = state.service.recent_history(state.service.history_count());
    // Live records at or below this id are already covered by the snapshot
    // and must not be delivered a second time.
    let mut last_delivered = history.last().map(|record| record.id);

    let welcome = ServerMessage::Connected {
        history_count: history.len(),
    };
    let snapshot = ServerMessage::History { records: history };
    if !send_message(&mut socket, &welcome).await || !send_message(&mut socket, &snapshot).await {
        // Client disconnected immediately
        state.service.unsubscribe(subscription.id);
        return;
    }

    loop {
        tokio::select! {
            // Broadcast records to the client
            record = subscription.receiver.recv() => {
                match record {
                    Some(record) => {
                        if last_delivered.is_some_and(|seen| record.id <= seen) {
                            continue;
                        }
                        last_delivered = Some(record.id);
                        if !send_message(&mut socket, &ServerMessage::Message { record }).await {
                            break; // Client disconnected
                        }
                    }
                    None => break, // Hub dropped this sink
                }
            }

            // Handle client frames
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(msg)) => {
                        if !handle_client_message(msg, &mut socket, &state).await {
                            break; // Client requested close or error
                        }
                    }
                    Some(Err(_)) => break, // WebSocket error
                    None => break, // Client disconnected
                }
            }
        }
    }

    state.service.unsubscribe(subscription.id);
    println!("User disconnected");
}

/// Handle a frame from the client
/// Returns false if the connection should be closed
async fn handle_client_message(msg: Message, socket: &mut WebSocket, state: &Arc<AppState>) -> bool {
    match msg {
        Message::Text(text) => {
            if let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) {
                match client_msg {
                    ClientMessage::Message { text } => {
                        if let Err(err) = state.service.submit(text) {
                            // RecordTooLarge: reported back to the submitter
                            // only, the broadcast loop is unaffected
                            let reply = ServerMessage::Error {
                                message: err.to_string(),
                            };
                            return send_message(socket, &reply).await;
                        }
                    }
                    ClientMessage::Ping => {
                        return send_message(socket, &ServerMessage::Pong).await;
                    }
                }
            }
            true
        }
        Message::Binary(_) => true, // Ignore binary frames
        Message::Ping(data) => {
            let _ = socket.send(Message::Pong(data)).await;
            true
        }
        Message::Pong(_) => true, // Ignore pong responses
        Message::Close(_) => false, // Client requested close
    }
}

/// Serialize and send a server message. Returns false once the client is gone.
async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(_) => true,
    }
}
