//! HTTP request handlers

use crate::api::AppState;
use crate::library::{self, LibraryEntry};
use crate::metadata::{self, TrackMetadata};
use crate::playback::StreamStatus;
use crate::stations::{self, Station};
use crate::{system, Error, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PlaybackStatusResponse {
    status: &'static str,
    track: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    queue: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    file_path: String,
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    position: usize,
}

#[derive(Debug, Serialize)]
pub struct PauseResponse {
    paused: bool,
}

#[derive(Debug, Serialize)]
pub struct StreamStatusResponse {
    status: StreamStatus,
    station: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayStreamRequest {
    station_name: String,
    station_url: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct BrowseParams {
    #[serde(default)]
    dir: String,
}

#[derive(Debug, Serialize)]
pub struct LibraryResponse {
    dir: String,
    entries: Vec<LibraryEntry>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistsResponse {
    playlists: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaylistLoadedResponse {
    loaded: usize,
}

#[derive(Debug, Serialize)]
pub struct SystemInfoResponse {
    info: String,
}

// ============================================================================
// Local Playback
// ============================================================================

/// GET /playback/status - current local playback state
pub async fn playback_status(
    State(state): State<AppState>,
) -> Result<Json<PlaybackStatusResponse>> {
    let snapshot = state.engine.playback().await?;
    Ok(Json(PlaybackStatusResponse {
        status: if snapshot.is_playing { "playing" } else { "idle" },
        track: snapshot.now_playing,
        error: snapshot.last_error,
    }))
}

/// GET /playback/now-playing - metadata for the current track
pub async fn now_playing(State(state): State<AppState>) -> Result<Json<TrackMetadata>> {
    let snapshot = state.engine.playback().await?;
    let meta = snapshot
        .now_playing
        .as_deref()
        .map(metadata::parse)
        .unwrap_or_else(TrackMetadata::none_playing);
    Ok(Json(meta))
}

/// GET /playback/queue - pending queue contents
pub async fn get_queue(State(state): State<AppState>) -> Result<Json<QueueResponse>> {
    let snapshot = state.engine.playback().await?;
    Ok(Json(QueueResponse {
        queue: snapshot.queue,
    }))
}

/// POST /playback/enqueue - append a track to the queue
pub async fn enqueue(
    State(state): State<AppState>,
    Json(req): Json<EnqueueRequest>,
) -> Result<Json<EnqueueResponse>> {
    info!("Enqueue request for file: {}", req.file_path);
    let position = state.engine.enqueue(req.file_path).await?;
    Ok(Json(EnqueueResponse { position }))
}

/// DELETE /playback/queue/{index} - remove a queued track
///
/// Out-of-range indices are accepted and ignored; the caller's view of the
/// queue may be stale.
pub async fn remove_queued(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<StatusCode> {
    state.engine.remove_at(index).await?;
    Ok(StatusCode::OK)
}

/// POST /playback/play - start queue playback
pub async fn play(State(state): State<AppState>) -> Result<StatusCode> {
    state.engine.play().await?;
    Ok(StatusCode::OK)
}

/// POST /playback/next - skip to the next queued track
pub async fn next_track(State(state): State<AppState>) -> Result<StatusCode> {
    state.engine.next().await?;
    Ok(StatusCode::OK)
}

/// POST /playback/previous - restart the current track
pub async fn previous_track(State(state): State<AppState>) -> Result<StatusCode> {
    state.engine.previous().await?;
    Ok(StatusCode::OK)
}

/// POST /playback/volume/up
pub async fn volume_up(State(state): State<AppState>) -> Result<StatusCode> {
    state.engine.volume_up().await?;
    Ok(StatusCode::OK)
}

/// POST /playback/volume/down
pub async fn volume_down(State(state): State<AppState>) -> Result<StatusCode> {
    state.engine.volume_down().await?;
    Ok(StatusCode::OK)
}

/// POST /playback/pause - toggle pause on the live decoder
///
/// 400 when nothing is playing.
pub async fn toggle_pause(State(state): State<AppState>) -> Result<Json<PauseResponse>> {
    let paused = state.engine.toggle_pause().await?;
    Ok(Json(PauseResponse { paused }))
}

// ============================================================================
// Radio Streams
// ============================================================================

/// GET /stream/status
pub async fn stream_status(State(state): State<AppState>) -> Result<Json<StreamStatusResponse>> {
    let snapshot = state.engine.stream().await?;
    Ok(Json(StreamStatusResponse {
        status: snapshot.status,
        station: snapshot.station,
    }))
}

/// POST /stream/play - start a named station
pub async fn play_stream(
    State(state): State<AppState>,
    Json(req): Json<PlayStreamRequest>,
) -> Result<StatusCode> {
    info!("Stream request for station: {}", req.station_name);
    state
        .engine
        .play_station(req.station_name, req.station_url)
        .await?;
    Ok(StatusCode::OK)
}

/// POST /stream/stop
pub async fn stop_stream(State(state): State<AppState>) -> Result<StatusCode> {
    state.engine.stop_stream().await?;
    Ok(StatusCode::OK)
}

/// GET /stations - the configured station list
pub async fn list_stations(State(state): State<AppState>) -> Result<Json<Vec<Station>>> {
    let list = stations::load_stations(&state.config.stations_file)?;
    Ok(Json(list))
}

// ============================================================================
// Library and Playlists
// ============================================================================

/// GET /library?dir=... - browse the music root
pub async fn browse_library(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Result<Json<LibraryResponse>> {
    let entries = library::browse(&state.config.music_dir, &params.dir)?;
    Ok(Json(LibraryResponse {
        dir: params.dir,
        entries,
    }))
}

/// GET /playlists - names of saved playlists
pub async fn list_playlists(State(state): State<AppState>) -> Result<Json<PlaylistsResponse>> {
    Ok(Json(PlaylistsResponse {
        playlists: state.playlists.list()?,
    }))
}

/// PUT /playlists/{name} - save the current queue under a name
pub async fn save_playlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode> {
    let snapshot = state.engine.playback().await?;
    if snapshot.queue.is_empty() {
        return Err(Error::BadRequest("queue is empty".to_string()));
    }
    state.playlists.save(&name, &snapshot.queue)?;
    info!("Saved playlist {} ({} tracks)", name, snapshot.queue.len());
    Ok(StatusCode::OK)
}

/// POST /playlists/{name}/load - replace the pending queue with a playlist
pub async fn load_playlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlaylistLoadedResponse>> {
    let tracks = state.playlists.load(&name)?;
    let loaded = state.engine.load_queue(tracks).await?;
    info!("Loaded playlist {} ({} tracks)", name, loaded);
    Ok(Json(PlaylistLoadedResponse { loaded }))
}

// ============================================================================
// System
// ============================================================================

/// GET /system/info
pub async fn system_info() -> Json<SystemInfoResponse> {
    Json(SystemInfoResponse {
        info: system::system_info().await,
    })
}

/// POST /system/shutdown
pub async fn system_shutdown() -> Result<&'static str> {
    system::shutdown().await?;
    Ok("System is shutting down...")
}

/// POST /system/reboot
pub async fn system_reboot() -> Result<&'static str> {
    system::reboot().await?;
    Ok("System is rebooting...")
}
