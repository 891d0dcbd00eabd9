// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const WS_CONNECTION: &str = "ws.connection";
pub const WS_DISCONNECTION: &str = "ws.disconnection";
pub const WS_ACTIVE: &str = "ws.active";
pub const USER_JOINED: &str = "user.joined";
pub const USER_LEFT: &str = "user.left";
pub const MESSAGE_SENT: &str = "message.sent";
pub const LOCATION_SHARED: &str = "location.shared";
pub const DELIVERY_DROPPED: &str = "delivery.dropped";
