//! Platform-agnostic media resource trait
//!
//! Abstracts the single audio-producing element the controller owns
//! (an `<audio>` element in a browser build, a decoder + output on
//! desktop). Only the controller may drive it.

use crate::error::Result;
use std::time::Duration;

/// The one thing that makes sound
///
/// Lifecycle notifications travel the other way, as [`ResourceEvent`]s
/// fed to [`PlaybackController::handle_event`](crate::PlaybackController::handle_event).
pub trait MediaResource: Send {
    /// Point the resource at a new URL, discarding whatever it had
    ///
    /// Loading is asynchronous; completion arrives as
    /// [`ResourceEvent::Loaded`] or [`ResourceEvent::Error`].
    fn load(&mut self, url: &str);

    /// Start or resume playback
    ///
    /// # Returns
    /// * `Ok(())` - Resource is playing
    /// * `Err(_)` - Resource refused (autoplay restriction, decode error)
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    /// Jump to `position` from the start of the track
    fn seek(&mut self, position: Duration);

    /// Set output volume in `[0, 1]`
    fn set_volume(&mut self, volume: f32);
}

/// Lifecycle notifications from the media resource
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    /// Metadata is available
    Loaded { duration: Option<Duration> },

    /// Playback position advanced, at the resource's own cadence
    TimeUpdate { position: Duration },

    /// Track played to completion
    Ended,

    /// Loading or decoding failed
    Error { message: String },
}
