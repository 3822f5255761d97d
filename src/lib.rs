//! # jukeboxd
//!
//! HTTP-controlled local playback daemon: owns a play queue, supervises a
//! single external decoder process (local files or internet radio, never
//! both), and exposes playback state to remote callers over a REST API.
//!
//! Audio rendering itself is delegated entirely to the decoder process;
//! jukeboxd's job is queue management, process lifecycle, and consistent
//! status reporting.

pub mod api;
pub mod config;
pub mod error;
pub mod library;
pub mod metadata;
pub mod playback;
pub mod playlist;
pub mod stations;
pub mod system;

pub use config::Config;
pub use error::{Error, Result};
pub use playback::PlaybackEngine;
