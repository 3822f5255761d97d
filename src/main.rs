//! jukeboxd - main entry point
//!
//! Wires configuration, the playback engine task, and the HTTP server
//! together, then serves until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukeboxd::api;
use jukeboxd::playlist::PlaylistStore;
use jukeboxd::{Config, PlaybackEngine};

/// Command-line arguments for jukeboxd
#[derive(Parser, Debug)]
#[command(name = "jukeboxd")]
#[command(about = "HTTP-controlled music playback daemon")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "JUKEBOXD_PORT")]
    port: Option<u16>,

    /// Root folder containing music files
    #[arg(short, long, env = "JUKEBOXD_MUSIC_DIR")]
    music_dir: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, env = "JUKEBOXD_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukeboxd=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(music_dir) = args.music_dir {
        config.music_dir = music_dir;
    }
    let config = Arc::new(config);

    info!("Starting jukeboxd on port {}", config.port);
    info!("Music root: {}", config.music_dir.display());

    let engine = PlaybackEngine::start(Arc::clone(&config));
    let playlists = PlaylistStore::new(config.playlist_dir.clone());

    let app = api::create_router(api::AppState {
        engine,
        playlists,
        config: Arc::clone(&config),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
