//! Playback controller - drives the media resource from playback state
//!
//! Watches the store for the intended track and play intent, resolves
//! URLs through the catalog, loads them into the one media resource it
//! owns, and turns resource lifecycle events back into state
//! transitions (most importantly "ended" into "advance to next").
//!
//! One tick is always state -> controller -> resource -> event ->
//! controller -> state. Failures are absorbed here: they stop playback
//! and surface as [`PlaybackEvent::Error`], never as returned errors.

use crate::{
    catalog::{ResolvedTrack, TrackResolver},
    error::Result,
    events::PlaybackEvent,
    resource::{MediaResource, ResourceEvent},
    settings::SettingsSource,
    state::PlaybackState,
    store::PlaybackStore,
    types::{PlayContext, TrackId, TransportState},
    volume::Volume,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// An in-flight URL resolution
///
/// Produced by [`PlaybackController::begin_load`] and handed back to
/// [`PlaybackController::complete_load`] with the resolver's answer.
/// Only the most recent request is ever acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub track_id: TrackId,
    pub playback_id: u64,
    generation: u64,
}

/// Owns the media resource and keeps it in line with [`PlaybackState`]
pub struct PlaybackController {
    store: PlaybackStore,
    resource: Box<dyn MediaResource>,
    resolver: Arc<dyn TrackResolver>,
    settings: Arc<dyn SettingsSource>,

    transport: TransportState,

    // (track, playback session) of the most recent load request
    requested: Option<(TrackId, u64)>,
    // Monotonic request counter; stale resolutions carry an older value
    generation: u64,
    // Track whose URL the resource currently holds
    loaded_track: Option<TrackId>,
    awaiting_metadata: bool,

    volume: Volume,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create a controller for `resource`
    ///
    /// The resource starts at the volume the settings report. Nothing is
    /// loaded until the first [`sync`](Self::sync).
    pub fn new(
        store: PlaybackStore,
        mut resource: Box<dyn MediaResource>,
        resolver: Arc<dyn TrackResolver>,
        settings: Arc<dyn SettingsSource>,
    ) -> Self {
        let volume = Volume::new(settings.volume());
        resource.set_volume(volume.output());

        Self {
            store,
            resource,
            resolver,
            settings,
            transport: TransportState::Idle,
            requested: None,
            generation: 0,
            loaded_track: None,
            awaiting_metadata: false,
            volume,
            pending_events: Vec::new(),
        }
    }

    // ===== Accessors =====

    pub fn store(&self) -> &PlaybackStore {
        &self.store
    }

    pub fn transport(&self) -> TransportState {
        self.transport
    }

    /// Track whose URL is currently loaded in the resource
    ///
    /// Unlike the store's active id this is what is actually audible.
    pub fn loaded_track(&self) -> Option<TrackId> {
        self.loaded_track
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Resource lifecycle sync =====

    /// Bring the resource in line with the store
    ///
    /// Starts a load when the active track or playback session changed,
    /// waits for the catalog, then reconciles play intent. A selection
    /// made while the catalog was answering supersedes that answer and is
    /// loaded in turn.
    pub async fn sync(&mut self) {
        while let Some(request) = self.begin_load() {
            let result = self.resolver.resolve(request.track_id).await;
            self.complete_load(request, result);
        }

        self.reconcile();
        self.store.flush_due();
    }

    /// Start loading the active track if it is not the one requested last
    ///
    /// Returns `None` when there is nothing new to load. Any request
    /// issued earlier becomes stale.
    pub fn begin_load(&mut self) -> Option<LoadRequest> {
        let (active, playback_id) = self
            .store
            .read(|state| (state.active_id(), state.playback_id()));
        let track_id = active?;

        if self.requested == Some((track_id, playback_id)) {
            return None;
        }

        self.generation += 1;
        self.requested = Some((track_id, playback_id));
        self.awaiting_metadata = false;
        self.set_transport(TransportState::Loading);
        self.store.update(|state| {
            state.set_loading(true);
            state.set_current_time(Duration::ZERO);
            state.set_duration(None);
        });

        debug!(
            "Requesting track {} (session {}, request {})",
            track_id, playback_id, self.generation
        );

        Some(LoadRequest {
            track_id,
            playback_id,
            generation: self.generation,
        })
    }

    /// Act on a finished resolution
    ///
    /// Stale requests (superseded by a later `begin_load`, or for a track
    /// that is no longer active) are dropped without touching anything.
    pub fn complete_load(&mut self, request: LoadRequest, result: Result<ResolvedTrack>) {
        if !self.is_current(&request) {
            debug!(
                "Discarding stale load for track {} (request {})",
                request.track_id, request.generation
            );
            return;
        }

        match result {
            Ok(track) => {
                info!("Loading track {} from {}", request.track_id, track.url);

                let previous = self.loaded_track.replace(request.track_id);
                self.apply_track_volume();
                self.resource.load(&track.url);
                self.awaiting_metadata = true;

                if let Some(hint) = track.duration_hint {
                    self.store.update(|state| state.set_duration(Some(hint)));
                }

                self.emit(PlaybackEvent::TrackChanged {
                    track_id: request.track_id,
                    previous_track_id: previous,
                });
            }
            Err(e) => {
                warn!("Track {} is not playable: {}", request.track_id, e);
                self.loaded_track = None;
                self.fail(e.to_string());
            }
        }
    }

    fn is_current(&self, request: &LoadRequest) -> bool {
        request.generation == self.generation
            && self.store.read(|state| {
                state.active_id() == Some(request.track_id)
                    && state.playback_id() == request.playback_id
            })
    }

    /// Feed a lifecycle notification from the media resource
    ///
    /// Synchronous part only; call [`sync`](Self::sync) afterwards (or use
    /// [`dispatch`](Self::dispatch)) so an advance loads the next track.
    pub fn handle_event(&mut self, event: ResourceEvent) {
        match event {
            ResourceEvent::Loaded { duration } => self.on_loaded(duration),
            ResourceEvent::TimeUpdate { position } => self.on_time_update(position),
            ResourceEvent::Ended => self.on_ended(),
            ResourceEvent::Error { message } => {
                if self.awaiting_metadata || self.transport.has_media() {
                    warn!("Media resource error: {}", message);
                    self.fail(message);
                } else {
                    debug!("Ignoring resource error outside of playback: {}", message);
                }
            }
        }
    }

    /// [`handle_event`](Self::handle_event) followed by [`sync`](Self::sync)
    pub async fn dispatch(&mut self, event: ResourceEvent) {
        self.handle_event(event);
        self.sync().await;
    }

    fn on_loaded(&mut self, duration: Option<Duration>) {
        if !self.awaiting_metadata {
            debug!("Ignoring metadata for a superseded load");
            return;
        }
        self.awaiting_metadata = false;

        self.store.update(|state| {
            state.set_loading(false);
            if duration.is_some() {
                state.set_duration(duration);
            }
        });
        self.set_transport(TransportState::Ready);
        self.reconcile();
    }

    fn on_time_update(&mut self, position: Duration) {
        if !self.transport.has_media() {
            return;
        }

        let duration = self.store.update(|state| {
            state.set_current_time(position);
            state.duration()
        });

        self.emit(PlaybackEvent::PositionUpdate {
            position_ms: position.as_millis() as u64,
            duration_ms: duration.map(|d| d.as_millis() as u64),
        });
        self.store.flush_due();
    }

    fn on_ended(&mut self) {
        if !matches!(
            self.transport,
            TransportState::Playing | TransportState::Paused | TransportState::Ready
        ) {
            debug!("Ignoring end of track in {:?}", self.transport);
            return;
        }

        if let Some(track_id) = self.loaded_track {
            self.emit(PlaybackEvent::TrackFinished { track_id });
        }
        self.set_transport(TransportState::Ended);

        let (repeat, at_end, queued) = self.store.read(|state| {
            (
                state.is_repeat(),
                state.is_at_context_end(),
                state.queue().len(),
            )
        });

        // Single-track loop wins over everything, including the queue
        if repeat {
            debug!("Repeating track {:?}", self.loaded_track);
            self.start_resource();
            return;
        }

        let autoplay = self.settings.autoplay();
        if !autoplay && at_end {
            info!("Reached end of context with autoplay off, stopping");
            self.store.set_playing(false);
            return;
        }

        let next = self.store.update(|state| state.activate_next(autoplay));
        match next {
            Some(track_id) => {
                debug!("Advancing to track {}", track_id);
                self.emit_queue_change(queued);
            }
            None => {
                info!("Nothing left to play");
                self.store.set_playing(false);
            }
        }
    }

    // ===== Reconciliation =====

    /// Make the resource match the `is_playing` intent
    ///
    /// Does nothing while loading; intent is kept until metadata arrives.
    fn reconcile(&mut self) {
        if !self.transport.has_media() {
            return;
        }

        let wants_playing = self.store.read(PlaybackState::is_playing);
        match (wants_playing, self.transport) {
            (true, TransportState::Ready | TransportState::Paused | TransportState::Ended) => {
                self.start_resource();
            }
            (false, TransportState::Playing) => {
                self.resource.pause();
                self.set_transport(TransportState::Paused);
            }
            _ => {}
        }
    }

    fn start_resource(&mut self) {
        if self.transport == TransportState::Ended {
            self.resource.seek(Duration::ZERO);
            self.store.update(|state| state.set_current_time(Duration::ZERO));
        }

        match self.resource.play() {
            Ok(()) => self.set_transport(TransportState::Playing),
            Err(e) => {
                warn!("Media resource refused to play: {}", e);
                self.store.set_playing(false);
                self.set_transport(TransportState::Paused);
                self.emit(PlaybackEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Stop after a failure; the user has to re-initiate
    fn fail(&mut self, message: String) {
        self.resource.pause();
        self.awaiting_metadata = false;
        self.store.update(|state| {
            state.set_playing(false);
            state.set_loading(false);
        });
        self.set_transport(TransportState::Idle);
        self.emit(PlaybackEvent::Error { message });
    }

    // ===== Transport controls =====

    /// Start a fresh playback session from a listing
    pub async fn play(
        &mut self,
        ids: Vec<TrackId>,
        active_id: TrackId,
        context: PlayContext,
        context_id: Option<String>,
    ) {
        self.store.play(ids, active_id, context, context_id);
        self.sync().await;
    }

    /// Skip forward using the same ordering rules as natural advance
    pub async fn play_next(&mut self) {
        let autoplay = self.settings.autoplay();
        let queued = self.store.read(|state| state.queue().len());

        match self.store.update(|state| state.activate_next(autoplay)) {
            Some(track_id) => {
                debug!("Skipping to track {}", track_id);
                self.emit_queue_change(queued);
            }
            None => debug!("Nothing to skip to"),
        }
        self.sync().await;
    }

    /// Go back one entry in the context list
    pub async fn play_previous(&mut self) {
        match self.store.update(PlaybackState::activate_previous) {
            Some(track_id) => debug!("Going back to track {}", track_id),
            None => debug!("Nothing to go back to"),
        }
        self.sync().await;
    }

    /// Flip the play intent
    ///
    /// After a failed load this re-requests the active track.
    pub async fn toggle_play_pause(&mut self) {
        let playing = self.store.update(|state| {
            state.toggle_playing();
            state.is_playing()
        });

        if playing && self.transport == TransportState::Idle {
            self.requested = None;
        }
        self.sync().await;
    }

    /// Jump within the loaded track
    pub fn seek(&mut self, position: Duration) {
        if !self.transport.has_media() {
            debug!("Ignoring seek with no media loaded");
            return;
        }

        let position = match self.store.read(PlaybackState::duration) {
            Some(duration) => position.min(duration),
            None => position,
        };

        self.resource.seek(position);
        self.store.update(|state| state.set_current_time(position));

        // Seeking back into a finished track makes it resumable from there
        if self.transport == TransportState::Ended {
            self.set_transport(TransportState::Paused);
        }
    }

    /// Jump to a fraction (0.0-1.0) of the track's duration
    pub fn seek_percent(&mut self, percent: f32) {
        let percent = percent.clamp(0.0, 1.0);
        if let Some(duration) = self.store.read(PlaybackState::duration) {
            self.seek(duration.mul_f32(percent));
        }
    }

    // ===== Volume =====

    /// Explicit user volume change (0.0-1.0)
    pub fn set_volume(&mut self, level: f32) {
        self.volume.set_level(level);
        self.push_volume();
    }

    pub fn mute(&mut self) {
        self.volume.mute();
        self.push_volume();
    }

    pub fn unmute(&mut self) {
        self.volume.unmute();
        self.push_volume();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.push_volume();
    }

    /// Track change: full volume unless the user asked to keep theirs
    fn apply_track_volume(&mut self) {
        if self.settings.remember_volume() {
            self.resource.set_volume(self.volume.output());
        } else {
            self.volume.reset();
            self.push_volume();
        }
    }

    fn push_volume(&mut self) {
        self.resource.set_volume(self.volume.output());
        self.emit(PlaybackEvent::VolumeChanged {
            level: self.volume.percent(),
            is_muted: self.volume.is_muted(),
        });
    }

    // ===== Events =====

    fn set_transport(&mut self, state: TransportState) {
        if self.transport != state {
            self.transport = state;
            self.emit(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_queue_change(&mut self, before: usize) {
        let length = self.store.read(|state| state.queue().len());
        if length != before {
            self.emit(PlaybackEvent::QueueChanged { length });
        }
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("transport", &self.transport)
            .field("requested", &self.requested)
            .field("loaded_track", &self.loaded_track)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}
