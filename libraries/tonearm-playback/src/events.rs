//! Playback Events
//!
//! Event-based communication for UI synchronization. The controller
//! queues these as it drives the media resource; hosts drain them with
//! [`PlaybackController::drain_events`](crate::PlaybackController::drain_events).
//! State snapshots themselves travel over [`PlaybackStore::subscribe`](crate::PlaybackStore::subscribe).

use crate::types::{TrackId, TransportState};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Transport state changed (loading, playing, paused, ...)
    StateChanged {
        /// The new transport state
        state: TransportState,
    },

    /// A new URL was handed to the resource
    #[serde(rename_all = "camelCase")]
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Track finished playing naturally (reached end)
    #[serde(rename_all = "camelCase")]
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Position update, at the resource's own cadence
    #[serde(rename_all = "camelCase")]
    PositionUpdate {
        position_ms: u64,
        duration_ms: Option<u64>,
    },

    /// Volume changed
    #[serde(rename_all = "camelCase")]
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Manual queue length changed as a result of advancing
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Something failed and playback stopped
    Error {
        /// Error message
        message: String,
    },
}
