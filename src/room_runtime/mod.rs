use crate::app::settings::{GameSettings, DEFAULT_SETTINGS_PATH};
use crate::game::room::Room;
use crate::transport::tcp_session::handle_socket;
use anyhow::Context;
use axum::{
    extract::State,
    http::Method,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

const DEFAULT_GAME_PORT: u16 = 11000;
const DEFAULT_HTTP_PORT: u16 = 8787;

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

/// Loads settings, starts the arena tick loop, then serves the game socket and the
/// status API until Ctrl+C.
pub async fn run_server() -> anyhow::Result<()> {
    let settings_path = env::var("SETTINGS_PATH")
        .map(|value| value.trim().to_string())
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    let settings = GameSettings::load_or_default(&settings_path);
    tracing::info!(
        ms_per_frame = settings.ms_per_frame,
        universe_size = settings.universe_size,
        respawn_rate = settings.respawn_rate,
        survival_mode = settings.survival_mode,
        walls = settings.walls.len(),
        "settings loaded"
    );

    let room = Room::start(settings);

    let game_port = env_port("PORT", DEFAULT_GAME_PORT);
    let game_address = format!("0.0.0.0:{game_port}");
    let game_listener = TcpListener::bind(&game_address)
        .await
        .with_context(|| format!("binding game socket on {game_address}"))?;
    tracing::info!("game socket listening on {game_address}");

    let http_port = env_port("HTTP_PORT", DEFAULT_HTTP_PORT);
    let http_address = format!("0.0.0.0:{http_port}");
    let http_listener = TcpListener::bind(&http_address)
        .await
        .with_context(|| format!("binding status api on {http_address}"))?;
    tracing::info!("status api listening on {http_address}");

    let router = status_router(Arc::clone(&room));
    let status_task = tokio::spawn(async move {
        if let Err(error) = axum::serve(http_listener, router).await {
            tracing::warn!(?error, "status api stopped");
        }
    });

    tokio::select! {
        _ = accept_loop(game_listener, room) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received Ctrl+C, shutting down");
        }
    }
    status_task.abort();
    Ok(())
}

fn env_port(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

async fn accept_loop(listener: TcpListener, room: Arc<Room>) {
    loop {
        match listener.accept().await {
            Ok((stream, address)) => {
                let room = Arc::clone(&room);
                tokio::spawn(async move {
                    handle_socket(stream, address, room).await;
                });
            }
            Err(error) => {
                tracing::warn!(?error, "accept failed");
            }
        }
    }
}

fn status_router(room: Arc<Room>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);
    Router::new()
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
        .layer(cors)
        .with_state(room)
}

async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

async fn stats(State(room): State<Arc<Room>>) -> impl IntoResponse {
    Json(room.stats())
}
