// ============================
// chatroom-backend-lib/src/ws_router.rs
// ============================
//! WebSocket router and connection handling.
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chatroom_common::{ClientEvent, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::lifecycle::ConnectionLifecycle;
use crate::metrics::{WS_ACTIVE, WS_CONNECTION, WS_DISCONNECTION};
use crate::AppState;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Handler for WebSocket connections
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    counter!(WS_CONNECTION).increment(1);
    gauge!(WS_ACTIVE).increment(1.0);

    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();

    // Outbound queue for this connection. The router hands events to the
    // queue; the forwarding task owns the actual socket writes, so no
    // broadcast ever blocks on this socket.
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(state.settings.outbound_buffer);

    let forward_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut lifecycle = ConnectionLifecycle::new(Arc::clone(&state));
    state.router.register(lifecycle.id(), tx.clone());
    debug!(connection = %lifecycle.id(), "connection accepted");

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => {
                let event = match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        let reply = ServerEvent::Error {
                            code: "MALFORMED".to_string(),
                            message: e.to_string(),
                        };
                        if tx.send(reply).await.is_err() {
                            break;
                        }
                        continue;
                    },
                };

                let result = match event {
                    ClientEvent::Join { username, room } => lifecycle.join(&username, &room),
                    ClientEvent::SendMessage { text } => lifecycle.send_message(&text),
                    ClientEvent::SendLocation {
                        latitude,
                        longitude,
                    } => lifecycle.send_location(latitude, longitude),
                };

                // Failures are acknowledged on this connection only
                if let Err(e) = result {
                    let reply = ServerEvent::Error {
                        code: e.code().to_string(),
                        message: e.to_string(),
                    };
                    let _ = tx.send(reply).await;

                    if e.is_fatal() {
                        warn!(connection = %lifecycle.id(), error = %e, "closing connection");
                        break;
                    }
                }
            },
            Message::Close(_) => break,
            // Ping/pong is answered by axum; binary frames are not part of
            // the protocol
            _ => {},
        }
    }

    // Runs on every exit path. Disconnect is idempotent, so an abrupt drop
    // racing a clean close cannot double-announce.
    lifecycle.disconnect();

    counter!(WS_DISCONNECTION).increment(1);
    gauge!(WS_ACTIVE).decrement(1.0);

    forward_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[tokio::test]
    async fn test_create_router() {
        let state = Arc::new(AppState::new(Settings::default()));
        let _app = create_router(state);
    }
}
