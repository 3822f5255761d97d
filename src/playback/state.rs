//! Snapshot types read by the HTTP layer
//!
//! The engine task owns the live state; these are the consistent copies it
//! hands out on request.

use serde::Serialize;

/// Point-in-time copy of the local playback session.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSnapshot {
    /// Track currently bound to the decoder, relative to the music root
    pub now_playing: Option<String>,
    pub is_playing: bool,
    pub is_paused: bool,
    /// Whether the decoder has emitted its start marker for this track
    pub playback_started: bool,
    /// Most recent decoder diagnostic or timeout message; overwritten, never
    /// appended
    pub last_error: Option<String>,
    /// Pending queue contents
    pub queue: Vec<String>,
}

/// Stream (radio) session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Idle,
    Playing,
    Error,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Idle => "idle",
            StreamStatus::Playing => "playing",
            StreamStatus::Error => "error",
        }
    }
}

/// Point-in-time copy of the stream session.
#[derive(Debug, Clone)]
pub struct StreamSnapshot {
    pub station: Option<String>,
    pub status: StreamStatus,
}

impl Default for StreamSnapshot {
    fn default() -> Self {
        Self {
            station: None,
            status: StreamStatus::Idle,
        }
    }
}
