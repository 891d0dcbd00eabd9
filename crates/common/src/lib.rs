// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the chatroom client and server.
//! This module defines the WebSocket protocol events and supporting types.

use serde::{Deserialize, Serialize};

/// Events sent from client to server
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Join a room
    /// # Fields
    /// * `username` - Display name to join under
    /// * `room` - Name of the room to join
    Join { username: String, room: String },
    /// Send a text message to the sender's room
    SendMessage { text: String },
    /// Share the sender's coordinates with the room
    SendLocation { latitude: f64, longitude: f64 },
}

/// Events sent from server to client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// A text message delivered to the room
    Message(ChatMessage),
    /// A shared-location message delivered to the room
    LocationMessage(LocationMessage),
    /// Membership roster for a room, sent whenever it changes
    #[serde(rename_all = "camelCase")]
    RoomData { room: String, users: Vec<String> },
    /// Acknowledgement for a request that failed; delivered only to the
    /// connection that triggered it
    #[serde(rename_all = "camelCase")]
    Error { code: String, message: String },
}

/// A text message record. Immutable once constructed; not retained after
/// delivery.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Sender's display name
    pub username: String,
    /// Message body
    pub text: String,
    /// Construction time, milliseconds since the Unix epoch
    pub created_at: i64,
}

/// A shared-location message record
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationMessage {
    /// Sender's display name
    pub username: String,
    /// Map link built from the sender's coordinates
    pub url: String,
    /// Construction time, milliseconds since the Unix epoch
    pub created_at: i64,
}
