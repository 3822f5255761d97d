//! Configuration loading
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest)
//! 2. Environment variable (handled by clap in `main.rs`)
//! 3. TOML config file
//! 4. Compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Daemon configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Port the HTTP server listens on
    pub port: u16,

    /// Root folder containing music files; all track references are relative
    /// to this directory
    pub music_dir: PathBuf,

    /// Directory holding saved playlists (one JSON file per playlist)
    pub playlist_dir: PathBuf,

    /// JSON file listing the available radio stations
    pub stations_file: PathBuf,

    /// External decoder program
    pub player_command: String,

    /// Arguments for local file playback; the resolved file path is appended
    pub file_args: Vec<String>,

    /// Arguments for stream playback; the stream URL is appended
    pub stream_args: Vec<String>,

    /// Substring of decoder stdout that marks a successful playback start
    pub start_marker: String,

    /// Seconds to wait for the start marker before recording an advisory
    /// timeout error
    pub start_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            music_dir: dirs::audio_dir().unwrap_or_else(|| PathBuf::from("./music")),
            playlist_dir: PathBuf::from("./playlists"),
            stations_file: PathBuf::from("./stations.json"),
            player_command: "mplayer".to_string(),
            file_args: vec!["-slave".to_string(), "-quiet".to_string()],
            stream_args: vec!["-quiet".to_string()],
            start_marker: "Starting playback".to_string(),
            start_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, or from the default
    /// locations (`~/.config/jukeboxd/config.toml`, then
    /// `/etc/jukeboxd/config.toml`). Falls back to compiled defaults when no
    /// file exists; a file that exists but fails to parse is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_file(),
        };

        match path {
            Some(p) if p.exists() => Self::from_file(&p),
            Some(p) if explicit.is_some() => {
                Err(Error::Config(format!("config file not found: {}", p.display())))
            }
            _ => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// First default config file location that exists, if any.
fn default_config_file() -> Option<PathBuf> {
    let user = dirs::config_dir().map(|d| d.join("jukeboxd").join("config.toml"));
    if let Some(ref p) = user {
        if p.exists() {
            return user;
        }
    }
    let system = PathBuf::from("/etc/jukeboxd/config.toml");
    if system.exists() {
        return Some(system);
    }
    None
}
