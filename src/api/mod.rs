//! REST API for the playback daemon
//!
//! All state-changing routes forward to the playback engine's command
//! channel; reads return the engine's latest consistent snapshot without ever
//! blocking on playback.

pub mod handlers;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::playback::PlaybackEngine;
use crate::playlist::PlaylistStore;
use crate::Error;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Playback engine handle
    pub engine: PlaybackEngine,
    /// Playlist store
    pub playlists: PlaylistStore,
    /// Daemon configuration
    pub config: Arc<Config>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api/v1",
            Router::new()
                // Local playback
                .route("/playback/status", get(handlers::playback_status))
                .route("/playback/now-playing", get(handlers::now_playing))
                .route("/playback/queue", get(handlers::get_queue))
                .route("/playback/enqueue", post(handlers::enqueue))
                .route("/playback/queue/:index", delete(handlers::remove_queued))
                .route("/playback/play", post(handlers::play))
                .route("/playback/next", post(handlers::next_track))
                .route("/playback/previous", post(handlers::previous_track))
                .route("/playback/volume/up", post(handlers::volume_up))
                .route("/playback/volume/down", post(handlers::volume_down))
                .route("/playback/pause", post(handlers::toggle_pause))
                // Radio streams
                .route("/stream/status", get(handlers::stream_status))
                .route("/stream/play", post(handlers::play_stream))
                .route("/stream/stop", post(handlers::stop_stream))
                .route("/stations", get(handlers::list_stations))
                // Library and playlists
                .route("/library", get(handlers::browse_library))
                .route("/playlists", get(handlers::list_playlists))
                .route("/playlists/:name", put(handlers::save_playlist))
                .route("/playlists/:name/load", post(handlers::load_playlist))
                // System
                .route("/system/info", get(handlers::system_info))
                .route("/system/shutdown", post(handlers::system_shutdown))
                .route("/system/reboot", post(handlers::system_reboot)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "jukeboxd",
        "version": env!("CARGO_PKG_VERSION"),
        "music_dir": state.config.music_dir.display().to_string(),
    }))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidReference(_)
            | Error::InvalidState(_)
            | Error::BadRequest(_)
            | Error::Parse(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Config(_) | Error::Io(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
