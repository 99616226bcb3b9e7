//! WebSocket upgrade handler for admin live connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Register a session with the room manager
//! 3. Join/leave channels on client request
//! 4. Forward channel emits until disconnect
//! 5. Leave every channel on disconnect

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::live::BroadcastTarget;
use crate::ports::SessionRegistry;

use super::{
    messages::{
        ClientMessage, ConnectedMessage, ErrorMessage, PongMessage, ServerMessage,
        SubscriptionMessage,
    },
    rooms::RoomManager,
};

/// Capacity of the per-connection queue for direct replies (pong, acks).
const REPLY_CAPACITY: usize = 16;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Room manager for channel-based routing.
    pub room_manager: Arc<RoomManager>,
}

impl WebSocketState {
    /// Create a new WebSocket state.
    pub fn new(room_manager: Arc<RoomManager>) -> Self {
        Self { room_manager }
    }
}

/// Handle WebSocket upgrade requests for the admin live view.
///
/// Route: `GET /ws/admin`
///
/// Session authentication is handled in front of this route.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// This function runs for the lifetime of the connection, handling:
/// - Forwarding channel emits to the client
/// - Processing client messages (subscribe, unsubscribe, ping)
/// - Cleanup on disconnect
async fn handle_socket(socket: WebSocket, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();
    let (session_id, mut outbox) = state.room_manager.connect().await;

    let connected = ServerMessage::Connected(ConnectedMessage {
        session_id: session_id.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    });

    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!(session_id = %session_id, "Failed to send connected message: {}", e);
        state.room_manager.disconnect(&session_id).await;
        return;
    }

    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(REPLY_CAPACITY);

    // Forward channel emits and direct replies to the client
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                Some(event) = outbox.recv() => event.to_server_message(),
                Some(reply) = reply_rx.recv() => reply,
                else => break,
            };
            if let Err(e) = send_message(&mut sender, &msg).await {
                tracing::debug!(session_id = %session_id, "Send error, closing connection: {}", e);
                break;
            }
        }
    });

    // Handle incoming messages from client
    let room_manager = Arc::clone(&state.room_manager);
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let reply = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => {
                            handle_client_message(&room_manager, &session_id, client_msg).await
                        }
                        Err(e) => ServerMessage::Error(ErrorMessage::new(
                            "invalid_message",
                            e.to_string(),
                        )),
                    };
                    if reply_tx.send(reply).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(session_id = %session_id, "Received unsupported binary message");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Protocol-level heartbeats are answered by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(session_id = %session_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(session_id = %session_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.room_manager.disconnect(&session_id).await;
}

/// Apply one client request and build the reply.
pub async fn handle_client_message(
    rooms: &RoomManager,
    session_id: &SessionId,
    msg: ClientMessage,
) -> ServerMessage {
    match msg {
        ClientMessage::Ping => ServerMessage::Pong(PongMessage {
            timestamp: Timestamp::now().to_rfc3339(),
        }),
        ClientMessage::Subscribe { channel } => {
            if let Err(e) = channel.parse::<BroadcastTarget>() {
                return ServerMessage::Error(ErrorMessage::new("invalid_channel", e.to_string()));
            }
            match rooms.join(session_id, &channel).await {
                Ok(()) => ServerMessage::Subscribed(SubscriptionMessage { channel }),
                Err(e) => ServerMessage::Error(ErrorMessage::new("subscribe_failed", e.to_string())),
            }
        }
        ClientMessage::Unsubscribe { channel } => match rooms.leave(session_id, &channel).await {
            Ok(()) => ServerMessage::Unsubscribed(SubscriptionMessage { channel }),
            Err(e) => ServerMessage::Error(ErrorMessage::new("unsubscribe_failed", e.to_string())),
        },
    }
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(json)).await
}

/// Create axum router for the WebSocket endpoint.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .merge(websocket_router().with_state(ws_state));
/// ```
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws/admin", get(ws_handler))
}
