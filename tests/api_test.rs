//! Integration tests for the jukeboxd REST API
//!
//! Exercises the router end to end with an in-memory request pipeline; the
//! decoder is never started in these tests.

use axum::body::Body;
use axum::Router;
use http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use jukeboxd::api::{create_router, AppState};
use jukeboxd::playlist::PlaylistStore;
use jukeboxd::{Config, PlaybackEngine};

struct TestServer {
    app: Router,
    _music: TempDir,
    _data: TempDir,
}

/// Build a router backed by a scratch music root:
/// `a.mp3`, `notes.txt`, and `rock/b.mp3`.
fn setup() -> TestServer {
    let music = TempDir::new().unwrap();
    std::fs::write(music.path().join("a.mp3"), b"").unwrap();
    std::fs::write(music.path().join("notes.txt"), b"").unwrap();
    std::fs::create_dir(music.path().join("rock")).unwrap();
    std::fs::write(music.path().join("rock/b.mp3"), b"").unwrap();

    let data = TempDir::new().unwrap();
    let stations_file = data.path().join("stations.json");
    std::fs::write(
        &stations_file,
        json!([
            {"name": "FIP", "url": "http://example.net/fip"},
            {"name": "Radio Paradise", "url": "http://example.net/rp"}
        ])
        .to_string(),
    )
    .unwrap();

    let config = Arc::new(Config {
        music_dir: music.path().to_path_buf(),
        playlist_dir: data.path().join("playlists"),
        stations_file,
        // never actually spawned in these tests
        player_command: "/bin/true".to_string(),
        ..Config::default()
    });

    let engine = PlaybackEngine::start(Arc::clone(&config));
    let playlists = PlaylistStore::new(config.playlist_dir.clone());
    let app = create_router(AppState {
        engine,
        playlists,
        config,
    });

    TestServer {
        app,
        _music: music,
        _data: data,
    }
}

async fn make_request(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    let method = Method::from_bytes(method.as_bytes()).unwrap();
    let builder = Request::builder().method(method).uri(path);

    let request = match body {
        Some(json_body) => builder
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json_body = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(&bytes).ok()
    };
    (status, json_body)
}

#[tokio::test]
async fn health_endpoint() {
    let server = setup();
    let (status, body) = make_request(&server.app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "jukeboxd");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn playback_status_is_idle_at_startup() {
    let server = setup();
    let (status, body) =
        make_request(&server.app, "GET", "/api/v1/playback/status", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["status"], "idle");
    assert_eq!(body["track"], Value::Null);
    assert_eq!(body["error"], Value::Null);
}

#[tokio::test]
async fn now_playing_defaults_to_placeholder() {
    let server = setup();
    let (status, body) =
        make_request(&server.app, "GET", "/api/v1/playback/now-playing", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["artist"], "");
    assert_eq!(body["title"], "No track playing");
}

#[tokio::test]
async fn enqueue_and_queue_management() {
    let server = setup();

    let (status, body) = make_request(
        &server.app,
        "POST",
        "/api/v1/playback/enqueue",
        Some(json!({"file_path": "a.mp3"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["position"], 1);

    let (status, body) = make_request(
        &server.app,
        "POST",
        "/api/v1/playback/enqueue",
        Some(json!({"file_path": "rock/b.mp3"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["position"], 2);

    let (status, body) = make_request(&server.app, "GET", "/api/v1/playback/queue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["queue"], json!(["a.mp3", "rock/b.mp3"]));

    // stale index: accepted, ignored
    let (status, _) =
        make_request(&server.app, "DELETE", "/api/v1/playback/queue/5", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = make_request(&server.app, "GET", "/api/v1/playback/queue", None).await;
    assert_eq!(body.unwrap()["queue"], json!(["a.mp3", "rock/b.mp3"]));

    let (status, _) =
        make_request(&server.app, "DELETE", "/api/v1/playback/queue/0", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = make_request(&server.app, "GET", "/api/v1/playback/queue", None).await;
    assert_eq!(body.unwrap()["queue"], json!(["rock/b.mp3"]));
}

#[tokio::test]
async fn enqueue_rejects_invalid_references() {
    let server = setup();

    for file_path in ["missing.mp3", "../escape.mp3", "/etc/passwd"] {
        let (status, body) = make_request(
            &server.app,
            "POST",
            "/api/v1/playback/enqueue",
            Some(json!({"file_path": file_path})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{file_path}");
        let error = body.unwrap()["error"].as_str().unwrap().to_string();
        assert!(error.contains("Invalid track reference"), "{error}");
    }

    let (_, body) = make_request(&server.app, "GET", "/api/v1/playback/queue", None).await;
    assert_eq!(body.unwrap()["queue"], json!([]));
}

#[tokio::test]
async fn pause_without_playback_is_rejected() {
    let server = setup();
    let (status, body) =
        make_request(&server.app, "POST", "/api/v1/playback/pause", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["error"]
        .as_str()
        .unwrap()
        .contains("nothing is playing"));
}

#[tokio::test]
async fn stream_status_is_idle_at_startup() {
    let server = setup();
    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/status", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["status"], "idle");
    assert_eq!(body["station"], Value::Null);
}

#[tokio::test]
async fn stations_are_served_from_the_configured_file() {
    let server = setup();
    let (status, body) = make_request(&server.app, "GET", "/api/v1/stations", None).await;
    assert_eq!(status, StatusCode::OK);
    let stations = body.unwrap();
    assert_eq!(stations.as_array().unwrap().len(), 2);
    assert_eq!(stations[0]["name"], "FIP");
    assert_eq!(stations[1]["url"], "http://example.net/rp");
}

#[tokio::test]
async fn library_browsing() {
    let server = setup();

    let (status, body) = make_request(&server.app, "GET", "/api/v1/library", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    let entries = body["entries"].as_array().unwrap();
    // directories first
    assert_eq!(entries[0]["name"], "rock");
    assert_eq!(entries[0]["is_directory"], true);
    let audio: Vec<&str> = entries
        .iter()
        .filter(|e| e["is_audio"] == true)
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(audio, vec!["a.mp3"]);

    let (status, body) =
        make_request(&server.app, "GET", "/api/v1/library?dir=rock", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["entries"][0]["rel_path"], "rock/b.mp3");

    let (status, _) = make_request(&server.app, "GET", "/api/v1/library?dir=..", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn playlist_save_list_load_flow() {
    let server = setup();

    // saving an empty queue is refused
    let (status, _) =
        make_request(&server.app, "PUT", "/api/v1/playlists/mix", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    make_request(
        &server.app,
        "POST",
        "/api/v1/playback/enqueue",
        Some(json!({"file_path": "a.mp3"})),
    )
    .await;

    let (status, _) =
        make_request(&server.app, "PUT", "/api/v1/playlists/mix", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = make_request(&server.app, "GET", "/api/v1/playlists", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["playlists"], json!(["mix"]));

    let (status, body) =
        make_request(&server.app, "POST", "/api/v1/playlists/mix/load", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["loaded"], 1);

    let (_, body) = make_request(&server.app, "GET", "/api/v1/playback/queue", None).await;
    assert_eq!(body.unwrap()["queue"], json!(["a.mp3"]));
}

#[tokio::test]
async fn playlist_name_and_lookup_errors() {
    let server = setup();

    make_request(
        &server.app,
        "POST",
        "/api/v1/playback/enqueue",
        Some(json!({"file_path": "a.mp3"})),
    )
    .await;

    let (status, _) =
        make_request(&server.app, "PUT", "/api/v1/playlists/bad!name", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        make_request(&server.app, "POST", "/api/v1/playlists/nope/load", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
