// ============================
// chatroom-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the chatroom WebSocket server.

pub mod config;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod message;
pub mod metrics;
pub mod moderation;
pub mod router;
pub mod ws_router;

use std::sync::Arc;

use crate::config::Settings;
use crate::directory::UserDirectory;
use crate::message::{Clock, MessageFactory, SystemClock};
use crate::moderation::{ContentPolicy, DenyListPolicy};
use crate::router::RoomRouter;

/// Application state shared across all connections
pub struct AppState {
    /// Settings manager
    pub settings: Arc<Settings>,
    /// Connection-to-user directory; the single piece of shared mutable state
    pub directory: Arc<UserDirectory>,
    /// Room broadcast router
    pub router: RoomRouter,
    /// Message factory
    pub messages: MessageFactory,
    /// Moderation predicate applied to outbound text
    pub policy: Arc<dyn ContentPolicy>,
}

impl AppState {
    /// Create application state with the wall clock and the configured
    /// deny-list moderation policy
    pub fn new(settings: Settings) -> Self {
        let policy = Arc::new(DenyListPolicy::new(settings.blocked_terms.clone()));
        Self::with_parts(settings, Arc::new(SystemClock), policy)
    }

    /// Create application state with an injected clock and moderation policy
    pub fn with_parts(
        settings: Settings,
        clock: Arc<dyn Clock>,
        policy: Arc<dyn ContentPolicy>,
    ) -> Self {
        let directory = Arc::new(UserDirectory::new());
        let router = RoomRouter::new(Arc::clone(&directory));

        Self {
            settings: Arc::new(settings),
            directory,
            router,
            messages: MessageFactory::new(clock),
            policy,
        }
    }
}
