//! Error types for jukeboxd
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Decoder/process faults are deliberately absent here: those are
//! absorbed into observable playback state (`last_error`, stream status) and
//! never surface as errors.

use thiserror::Error;

/// Main error type for jukeboxd
#[derive(Error, Debug)]
pub enum Error {
    /// Track path escapes the music root or does not exist
    #[error("Invalid track reference: {0}")]
    InvalidReference(String),

    /// Operation not valid in the current playback state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed input at the HTTP boundary
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored data could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using jukeboxd Error
pub type Result<T> = std::result::Result<T, Error>;
