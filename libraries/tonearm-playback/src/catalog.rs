//! Catalog collaborator: turns identifiers into something playable

use crate::error::Result;
use crate::types::TrackId;
use async_trait::async_trait;
use std::time::Duration;

/// A track the media resource can load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    /// URL handed to the media resource
    pub url: String,

    /// Duration from the catalog, if it knows one before the resource does
    pub duration_hint: Option<Duration>,
}

impl ResolvedTrack {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            duration_hint: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_hint = Some(duration);
        self
    }
}

/// Resolves the active identifier to a playable URL
///
/// Failures (including [`PlaybackError::TrackNotFound`](crate::PlaybackError::TrackNotFound))
/// are treated by the controller as "nothing to play". It never retries.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, id: TrackId) -> Result<ResolvedTrack>;
}
