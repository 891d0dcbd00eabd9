// ============================
// chatroom-backend-lib/src/lifecycle.rs
// ============================
//! Per-connection lifecycle.
//!
//! One `ConnectionLifecycle` is owned by each connection's task and drives
//! it through join, messaging and disconnect, keeping the directory and the
//! room's view of membership in step. Operations return synchronously; the
//! transport adapter turns an `Err` into an error acknowledgement on the
//! triggering connection.

use std::sync::Arc;

use chatroom_common::ServerEvent;
use metrics::counter;
use tracing::info;

use crate::directory::ConnectionId;
use crate::error::AppError;
use crate::message::SYSTEM_SENDER;
use crate::metrics::{LOCATION_SHARED, MESSAGE_SENT, USER_JOINED, USER_LEFT};
use crate::AppState;

/// Connection states. `Disconnected` is terminal; there is no way back to
/// `Unjoined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unjoined,
    Joined,
    Disconnected,
}

/// State machine for a single connection
pub struct ConnectionLifecycle {
    state: Arc<AppState>,
    id: ConnectionId,
    status: ConnectionState,
}

impl ConnectionLifecycle {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            id: ConnectionId::new(),
            status: ConnectionState::Unjoined,
        }
    }

    /// The identity the transport registered this connection under
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn status(&self) -> ConnectionState {
        self.status
    }

    /// Join a room. On failure the connection stays `Unjoined` and nothing
    /// is broadcast. On success the joiner gets a private welcome, the rest
    /// of the room gets the join announcement, and everyone in the room
    /// gets the post-join roster.
    pub fn join(&mut self, username: &str, room: &str) -> Result<(), AppError> {
        if self.status != ConnectionState::Unjoined {
            // A repeated join would leave a second record behind when the
            // connection drops. Fatal: the transport closes the connection.
            return Err(AppError::Internal(format!(
                "join on a connection in state {:?}",
                self.status
            )));
        }

        let user = self.state.directory.add_user(self.id, username, room)?;
        self.status = ConnectionState::Joined;

        counter!(USER_JOINED).increment(1);
        info!(user = %user.username, room = %user.room, "user joined");

        let router = &self.state.router;
        let messages = &self.state.messages;

        router.send_to(
            self.id,
            &ServerEvent::Message(messages.text(SYSTEM_SENDER, "Welcome!")),
        );
        router.broadcast_to_room_except(
            &user.room,
            self.id,
            &ServerEvent::Message(
                messages.text(SYSTEM_SENDER, &format!("{} has joined!", user.username)),
            ),
        );
        // Roster read happens strictly after the directory insert, so the
        // broadcast reflects post-join membership
        self.broadcast_roster(&user.room);

        Ok(())
    }

    /// Relay a text message to the sender's room, sender included
    pub fn send_message(&self, text: &str) -> Result<(), AppError> {
        let user = self
            .state
            .directory
            .get_user(self.id)
            .ok_or(AppError::UnknownUser)?;

        if !self.state.policy.allows(text) {
            return Err(AppError::ContentRejected);
        }

        counter!(MESSAGE_SENT).increment(1);
        let message = self.state.messages.text(&user.username, text);
        self.state
            .router
            .broadcast_to_room(&user.room, &ServerEvent::Message(message));
        Ok(())
    }

    /// Share coordinates with the sender's room as a map link. Location
    /// payloads are not moderated.
    pub fn send_location(&self, latitude: f64, longitude: f64) -> Result<(), AppError> {
        let user = self
            .state
            .directory
            .get_user(self.id)
            .ok_or(AppError::UnknownUser)?;

        counter!(LOCATION_SHARED).increment(1);
        let message = self
            .state
            .messages
            .location(&user.username, latitude, longitude);
        self.state
            .router
            .broadcast_to_room(&user.room, &ServerEvent::LocationMessage(message));
        Ok(())
    }

    /// Tear the connection down. Safe in any state and safe to call more
    /// than once; only a connection that had joined announces a departure,
    /// and only on the first call.
    pub fn disconnect(&mut self) {
        self.state.router.unregister(self.id);

        if let Some(user) = self.state.directory.remove_user(self.id) {
            counter!(USER_LEFT).increment(1);
            info!(user = %user.username, room = %user.room, "user left");

            self.state.router.broadcast_to_room(
                &user.room,
                &ServerEvent::Message(
                    self.state
                        .messages
                        .text(SYSTEM_SENDER, &format!("{} has left!", user.username)),
                ),
            );
            self.broadcast_roster(&user.room);
        }

        self.status = ConnectionState::Disconnected;
    }

    fn broadcast_roster(&self, room: &str) {
        let users = self.state.directory.list_users_in_room(room);
        self.state.router.broadcast_to_room(
            room,
            &ServerEvent::RoomData {
                room: room.to_string(),
                users,
            },
        );
    }
}
