//! Playback engine: queue, decoder process supervision, and the transition
//! state machine.
//!
//! All mutable playback state is owned by a single engine task
//! ([`engine::PlaybackEngine`] spawns it); HTTP handlers and decoder I/O
//! tasks communicate with it exclusively through channels.

pub mod engine;
pub mod queue;
pub mod state;
pub mod supervisor;

pub use engine::PlaybackEngine;
pub use state::{PlaybackSnapshot, StreamSnapshot, StreamStatus};
