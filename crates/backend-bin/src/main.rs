// ============================
// chatroom-backend-bin/src/main.rs
// ============================
//! Runnable chatroom server.
use std::sync::Arc;

use anyhow::Result;
use chatroom_backend_lib::config::Settings;
use chatroom_backend_lib::{ws_router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Settings from config.toml / environment, falling back to the
    // checked-in defaults file
    let settings = Settings::load().or_else(|_| Settings::load_from("config/default.toml"))?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let state = Arc::new(AppState::new(settings));
    let app = ws_router::create_router(Arc::clone(&state));

    let listener = TcpListener::bind(state.settings.bind_addr).await?;
    info!(addr = %state.settings.bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
