// ============================
// chatroom-backend-lib/src/directory.rs
// ============================
//! Connection-to-user directory.
//!
//! The directory is the single piece of shared mutable state in the
//! coordinator. It maps each live connection to its user record; rooms are
//! a computed view over those records rather than a second collection, so
//! membership can never disagree with the records themselves.

use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::AppError;

/// Opaque per-connection identity, assigned when the transport accepts the
/// connection and invalidated on disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A live user record. One per joined connection; never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ConnectionId,
    pub username: String,
    pub room: String,
}

/// In-memory user directory guarded by a single lock.
///
/// All operations take the lock for their whole duration, so no caller can
/// observe a half-updated membership set. Records keep their insertion
/// order, which doubles as the roster display order.
pub struct UserDirectory {
    users: RwLock<Vec<User>>,
}

/// Key form used for uniqueness comparison: case-insensitive with
/// whitespace runs collapsed
fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }

    /// Register a user record for a connection.
    ///
    /// Both fields are trimmed before use. Fails with `MissingField` when
    /// either is empty afterwards and with `DuplicateUser` when a live
    /// connection already holds the same (username, room) pair. A second
    /// insert for the same connection is a bug in the caller and reported
    /// as fatal.
    pub fn add_user(
        &self,
        id: ConnectionId,
        username: &str,
        room: &str,
    ) -> Result<User, AppError> {
        let username = username.trim();
        let room = room.trim();
        if username.is_empty() || room.is_empty() {
            return Err(AppError::MissingField);
        }

        let name_key = normalize(username);
        let room_key = normalize(room);

        let mut users = self.users.write();

        if users.iter().any(|u| u.id == id) {
            return Err(AppError::Internal(format!(
                "connection {id} already has a user record"
            )));
        }

        let taken = users
            .iter()
            .any(|u| normalize(&u.room) == room_key && normalize(&u.username) == name_key);
        if taken {
            return Err(AppError::DuplicateUser);
        }

        let user = User {
            id,
            username: username.to_string(),
            room: room.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    /// Remove the record for a connection, returning it so the caller can
    /// announce the departure. A miss is a no-op, so disconnect handling
    /// can run more than once safely.
    pub fn remove_user(&self, id: ConnectionId) -> Option<User> {
        let mut users = self.users.write();
        let pos = users.iter().position(|u| u.id == id)?;
        Some(users.remove(pos))
    }

    /// Read-only lookup
    pub fn get_user(&self, id: ConnectionId) -> Option<User> {
        self.users.read().iter().find(|u| u.id == id).cloned()
    }

    /// Usernames currently in a room, in join order
    pub fn list_users_in_room(&self, room: &str) -> Vec<String> {
        let room_key = normalize(room);
        self.users
            .read()
            .iter()
            .filter(|u| normalize(&u.room) == room_key)
            .map(|u| u.username.clone())
            .collect()
    }

    /// Membership snapshot for the router
    pub fn connections_in_room(&self, room: &str) -> Vec<ConnectionId> {
        let room_key = normalize(room);
        self.users
            .read()
            .iter()
            .filter(|u| normalize(&u.room) == room_key)
            .map(|u| u.id)
            .collect()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
