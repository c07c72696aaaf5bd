//! Error types for playback management

use crate::types::TrackId;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Catalog has no playable entry for the identifier
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Catalog lookup failed for another reason
    #[error("Track resolution failed: {0}")]
    Resolution(String),

    /// Media resource refused to start (autoplay restriction, decode error)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// Persistence backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
