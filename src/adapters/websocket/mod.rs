//! WebSocket adapters for the admin live view.
//!
//! This module provides the transport behind the `SessionRegistry` port:
//! admin clients connect, join channels, and receive whatever the
//! broadcast router emits on those channels.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        BroadcastRouter                               │
//! │   emit_to_channel("admin-seller-42", "seller.updated", payload)     │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      RoomManager                                     │
//! │   admin-dashboard      admin-seller-42      seller-42               │
//! │   ├── session-a        ├── session-a        └── session-d           │
//! │   └── session-b        └── session-c                                │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │ per-session outbox
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 ws_handler (one task pair per socket)                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`rooms`] - Channel rooms and per-session outboxes
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;
pub mod rooms;

pub use handler::{handle_client_message, websocket_router, ws_handler, WebSocketState};
pub use messages::{
    ChannelEvent, ClientMessage, ConnectedMessage, ErrorMessage, EventMessage, PongMessage,
    ServerMessage, SubscriptionMessage,
};
pub use rooms::{RoomManager, DEFAULT_OUTBOX_CAPACITY};
