//! Core types for playback management

use serde::{Deserialize, Serialize};

/// Opaque key into the external catalog
///
/// The playback core only orders and selects identifiers, it never
/// inspects what they point at.
pub type TrackId = i64;

/// Why the current ordered list is the current ordered list
///
/// Carried alongside the context list for UI highlighting and for
/// resuming ordered playback after a queue detour. Has no effect on
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayContext {
    #[default]
    None,
    Liked,
    Uploaded,
    Playlist,
    Artist,
    Search,
    Home,
    Album,
    Queue,
}

impl PlayContext {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Liked => "liked",
            Self::Uploaded => "uploaded",
            Self::Playlist => "playlist",
            Self::Artist => "artist",
            Self::Search => "search",
            Self::Home => "home",
            Self::Album => "album",
            Self::Queue => "queue",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "liked" => Some(Self::Liked),
            "uploaded" => Some(Self::Uploaded),
            "playlist" => Some(Self::Playlist),
            "artist" => Some(Self::Artist),
            "search" => Some(Self::Search),
            "home" => Some(Self::Home),
            "album" => Some(Self::Album),
            "queue" => Some(Self::Queue),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlayContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the controller believes the media resource is doing
///
/// ```text
/// Idle -> Loading -> Ready -> Playing <-> Paused -> Ended -> (Loading | Ended)
///            \-> Idle (resolution or resource error)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    /// Nothing loaded, or the last load failed
    #[default]
    Idle,

    /// URL requested from the catalog or handed to the resource,
    /// waiting for metadata
    Loading,

    /// Metadata known, not yet asked to play
    Ready,

    /// Resource is producing audio
    Playing,

    /// Resource is loaded but paused
    Paused,

    /// Track finished and nothing followed it
    Ended,
}

impl TransportState {
    /// Whether a resource is loaded and can take play/pause/seek
    #[must_use]
    pub fn has_media(&self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Paused | Self::Ended)
    }
}
