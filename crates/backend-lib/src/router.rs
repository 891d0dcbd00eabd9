// ============================
// chatroom-backend-lib/src/router.rs
// ============================
//! Room broadcast router.
//!
//! Resolves a room name to its live connections and fans events out to
//! them. Delivery is best-effort: each connection has a bounded outbound
//! queue owned by its forwarding task, and a full or closed queue drops
//! the frame for that connection only.

use std::sync::Arc;

use chatroom_common::ServerEvent;
use dashmap::DashMap;
use metrics::counter;
use tokio::sync::mpsc;
use tracing::warn;

use crate::directory::{ConnectionId, UserDirectory};
use crate::metrics::DELIVERY_DROPPED;

/// Fan-out router over the per-connection outbound queues
pub struct RoomRouter {
    directory: Arc<UserDirectory>,
    clients: DashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
}

impl RoomRouter {
    pub fn new(directory: Arc<UserDirectory>) -> Self {
        Self {
            directory,
            clients: DashMap::new(),
        }
    }

    /// Attach a connection's outbound queue. Called by the transport when
    /// the socket is accepted.
    pub fn register(&self, id: ConnectionId, tx: mpsc::Sender<ServerEvent>) {
        self.clients.insert(id, tx);
    }

    /// Detach a connection's outbound queue. Idempotent.
    pub fn unregister(&self, id: ConnectionId) {
        self.clients.remove(&id);
    }

    /// Best-effort delivery to a single connection. Unknown connections and
    /// full or closed queues are skipped; a stalled peer must not stall the
    /// caller.
    pub fn send_to(&self, id: ConnectionId, event: &ServerEvent) {
        let Some(tx) = self.clients.get(&id) else {
            return;
        };
        if tx.try_send(event.clone()).is_err() {
            counter!(DELIVERY_DROPPED).increment(1);
            warn!(connection = %id, "dropping frame for slow or closed connection");
        }
    }

    /// Deliver an event to every live connection in the room. Membership is
    /// snapshotted from the directory once before any send, so the
    /// directory lock is never held while sending.
    pub fn broadcast_to_room(&self, room: &str, event: &ServerEvent) {
        for id in self.directory.connections_in_room(room) {
            self.send_to(id, event);
        }
    }

    /// Same as [`broadcast_to_room`](Self::broadcast_to_room), skipping one
    /// connection
    pub fn broadcast_to_room_except(
        &self,
        room: &str,
        excluded: ConnectionId,
        event: &ServerEvent,
    ) {
        for id in self.directory.connections_in_room(room) {
            if id != excluded {
                self.send_to(id, event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatroom_common::ChatMessage;

    fn event(text: &str) -> ServerEvent {
        ServerEvent::Message(ChatMessage {
            username: "admin".to_string(),
            text: text.to_string(),
            created_at: 0,
        })
    }

    fn join(
        directory: &UserDirectory,
        router: &RoomRouter,
        username: &str,
        room: &str,
    ) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(8);
        router.register(id, tx);
        directory.add_user(id, username, room).unwrap();
        (id, rx)
    }

    #[tokio::test]
    async fn test_broadcast_reaches_whole_room() {
        let directory = Arc::new(UserDirectory::new());
        let router = RoomRouter::new(Arc::clone(&directory));

        let (_anna, mut anna_rx) = join(&directory, &router, "anna", "lobby");
        let (_bob, mut bob_rx) = join(&directory, &router, "bob", "lobby");
        let (_cleo, mut cleo_rx) = join(&directory, &router, "cleo", "garden");

        router.broadcast_to_room("lobby", &event("hello"));

        assert_eq!(anna_rx.recv().await.unwrap(), event("hello"));
        assert_eq!(bob_rx.recv().await.unwrap(), event("hello"));
        assert!(cleo_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_except_skips_one_connection() {
        let directory = Arc::new(UserDirectory::new());
        let router = RoomRouter::new(Arc::clone(&directory));

        let (anna, mut anna_rx) = join(&directory, &router, "anna", "lobby");
        let (_bob, mut bob_rx) = join(&directory, &router, "bob", "lobby");

        router.broadcast_to_room_except("lobby", anna, &event("anna has joined!"));

        assert!(anna_rx.try_recv().is_err());
        assert_eq!(bob_rx.recv().await.unwrap(), event("anna has joined!"));
    }

    #[tokio::test]
    async fn test_full_queue_does_not_block_the_room() {
        let directory = Arc::new(UserDirectory::new());
        let router = RoomRouter::new(Arc::clone(&directory));

        // A stalled connection with a single-slot queue nobody drains
        let stalled = ConnectionId::new();
        let (stalled_tx, _stalled_rx) = mpsc::channel(1);
        router.register(stalled, stalled_tx);
        directory.add_user(stalled, "snail", "lobby").unwrap();

        let (_bob, mut bob_rx) = join(&directory, &router, "bob", "lobby");

        router.broadcast_to_room("lobby", &event("one"));
        router.broadcast_to_room("lobby", &event("two"));

        // The healthy peer still gets both frames, in order
        assert_eq!(bob_rx.recv().await.unwrap(), event("one"));
        assert_eq!(bob_rx.recv().await.unwrap(), event("two"));
    }

    #[tokio::test]
    async fn test_send_to_unregistered_connection_is_a_noop() {
        let directory = Arc::new(UserDirectory::new());
        let router = RoomRouter::new(directory);

        router.send_to(ConnectionId::new(), &event("nobody home"));
    }

    #[tokio::test]
    async fn test_unregistered_member_is_skipped() {
        let directory = Arc::new(UserDirectory::new());
        let router = RoomRouter::new(Arc::clone(&directory));

        let (anna, _anna_rx) = join(&directory, &router, "anna", "lobby");
        let (_bob, mut bob_rx) = join(&directory, &router, "bob", "lobby");

        // Transport dropped anna's queue but the directory entry is still
        // being cleaned up
        router.unregister(anna);
        router.broadcast_to_room("lobby", &event("hello"));

        assert_eq!(bob_rx.recv().await.unwrap(), event("hello"));
    }
}
