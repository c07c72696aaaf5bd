//! Tonearm - Playback Management
//!
//! The playback state machine behind the Tonearm player: what is
//! playing, what plays next, and why.
//!
//! This crate provides:
//! - Playback state with a context list, a manual FIFO queue, shuffle and repeat
//! - Next/previous resolution that resumes context order after queue detours
//! - An observable store (tokio `watch`) with debounced session persistence
//! - A controller that owns one media resource and reconciles it with the state
//! - Optional browser bindings (`wasm` feature) backed by web storage
//!
//! # Architecture
//!
//! `tonearm-playback` is platform-agnostic:
//! - The media resource, the catalog and the settings are traits
//! - Persistence goes through a key-value port (memory, files, web storage)
//! - No global state; the store is an explicit handle
//!
//! # Example: Ordering
//!
//! ```rust
//! use tonearm_playback::{PlayContext, PlaybackState};
//!
//! let mut state = PlaybackState::new();
//! state.play(vec![1, 2, 3], 2, PlayContext::Album, Some("album-7".to_string()));
//!
//! // Queued tracks always come first
//! state.enqueue(9);
//! assert_eq!(state.activate_next(true), Some(9));
//!
//! // ...then context order resumes after the track that was playing
//! assert_eq!(state.activate_next(true), Some(3));
//!
//! // Previous always wraps
//! state.set_active(1);
//! assert_eq!(state.resolve_previous(), Some(3));
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tonearm_playback::{
//!     async_trait, MediaResource, PlayContext, PlaybackController, PlaybackSettings,
//!     PlaybackStore, ResolvedTrack, ResourceEvent, Result, TrackId, TrackResolver,
//! };
//!
//! struct Catalog;
//!
//! #[async_trait]
//! impl TrackResolver for Catalog {
//!     async fn resolve(&self, id: TrackId) -> Result<ResolvedTrack> {
//!         Ok(ResolvedTrack::new(format!("https://cdn.example.com/{id}.mp3")))
//!     }
//! }
//!
//! struct Speaker;
//!
//! impl MediaResource for Speaker {
//!     fn load(&mut self, _url: &str) {}
//!     fn play(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position: Duration) {}
//!     fn set_volume(&mut self, _volume: f32) {}
//! }
//!
//! # async fn run() {
//! let store = PlaybackStore::default();
//! let mut controller = PlaybackController::new(
//!     store.clone(),
//!     Box::new(Speaker),
//!     Arc::new(Catalog),
//!     Arc::new(PlaybackSettings::default()),
//! );
//!
//! controller.play(vec![1, 2, 3], 1, PlayContext::Playlist, None).await;
//!
//! // Forward the resource's lifecycle callbacks
//! controller.dispatch(ResourceEvent::Loaded { duration: Some(Duration::from_secs(200)) }).await;
//! controller.dispatch(ResourceEvent::Ended).await;
//! assert_eq!(store.snapshot().active_id(), Some(2));
//! # }
//! ```

mod catalog;
mod config;
mod controller;
mod error;
mod events;
mod persistence;
mod queue;
mod resource;
mod settings;
mod state;
mod store;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use async_trait::async_trait;
pub use catalog::{ResolvedTrack, TrackResolver};
pub use self::config::{PersistenceSettings, PlaybackSettings, PlayerConfig};
pub use controller::{LoadRequest, PlaybackController};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use persistence::{FileStorage, MemoryStorage, PersistedPlayback, Persister, StateStorage};
pub use queue::ManualQueue;
pub use resource::{MediaResource, ResourceEvent};
pub use settings::{SettingsSource, SharedSettings};
pub use state::PlaybackState;
pub use store::PlaybackStore;
pub use types::{PlayContext, TrackId, TransportState};
pub use volume::Volume;
