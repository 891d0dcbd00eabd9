// ============================
// chatroom-backend-lib/src/message.rs
// ============================
//! Message construction.
use std::sync::Arc;

use chatroom_common::{ChatMessage, LocationMessage};

/// Reserved sender name for system announcements
pub const SYSTEM_SENDER: &str = "Admin";

/// Time source for message timestamps. Injected so tests can pin the clock.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Builds immutable message records, stamped from the injected clock at
/// call time
#[derive(Clone)]
pub struct MessageFactory {
    clock: Arc<dyn Clock>,
}

impl MessageFactory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Build a text message record
    pub fn text(&self, username: &str, text: &str) -> ChatMessage {
        ChatMessage {
            username: username.to_string(),
            text: text.to_string(),
            created_at: self.clock.now_millis(),
        }
    }

    /// Build a location message record; the payload is a map link to the
    /// given coordinates
    pub fn location(&self, username: &str, latitude: f64, longitude: f64) -> LocationMessage {
        LocationMessage {
            username: username.to_string(),
            url: format!("https://www.google.com/maps?q={latitude},{longitude}"),
            created_at: self.clock.now_millis(),
        }
    }
}
