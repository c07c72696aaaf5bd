//! Shared fakes for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tonearm_playback::{
    async_trait, MediaResource, PlaybackController, PlaybackError, PlaybackSettings,
    PlaybackStore, ResolvedTrack, Result, SharedSettings, TrackId, TrackResolver,
};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (`RUST_LOG=debug` to see it)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Everything the controller asked the resource to do
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceCall {
    Load(String),
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
}

#[derive(Debug, Default)]
struct ResourceLog {
    calls: Vec<ResourceCall>,
    reject_play: bool,
}

/// Recording media resource; clones of the handle observe the same log
#[derive(Debug, Clone, Default)]
pub struct FakeResource {
    log: Arc<Mutex<ResourceLog>>,
}

impl FakeResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ResourceCall> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().calls.clear();
    }

    /// URLs loaded so far, in order
    pub fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ResourceCall::Load(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn play_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == ResourceCall::Play)
            .count()
    }

    pub fn last_volume(&self) -> Option<f32> {
        self.calls().into_iter().rev().find_map(|call| match call {
            ResourceCall::SetVolume(v) => Some(v),
            _ => None,
        })
    }

    /// Make subsequent `play()` calls fail like a blocked autoplay
    pub fn reject_play(&self, reject: bool) {
        self.log.lock().unwrap().reject_play = reject;
    }
}

impl MediaResource for FakeResource {
    fn load(&mut self, url: &str) {
        self.log
            .lock()
            .unwrap()
            .calls
            .push(ResourceCall::Load(url.to_string()));
    }

    fn play(&mut self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.reject_play {
            return Err(PlaybackError::PlaybackRejected(
                "play() request was blocked".to_string(),
            ));
        }
        log.calls.push(ResourceCall::Play);
        Ok(())
    }

    fn pause(&mut self) {
        self.log.lock().unwrap().calls.push(ResourceCall::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.log
            .lock()
            .unwrap()
            .calls
            .push(ResourceCall::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.log
            .lock()
            .unwrap()
            .calls
            .push(ResourceCall::SetVolume(volume));
    }
}

/// Catalog that knows a fixed set of tracks
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    tracks: HashMap<TrackId, ResolvedTrack>,
}

impl MapResolver {
    /// Catalog where every id in `ids` resolves to [`url_for`]
    pub fn with_tracks(ids: impl IntoIterator<Item = TrackId>) -> Self {
        Self {
            tracks: ids
                .into_iter()
                .map(|id| (id, ResolvedTrack::new(url_for(id))))
                .collect(),
        }
    }
}

#[async_trait]
impl TrackResolver for MapResolver {
    async fn resolve(&self, id: TrackId) -> Result<ResolvedTrack> {
        self.tracks
            .get(&id)
            .cloned()
            .ok_or(PlaybackError::TrackNotFound(id))
    }
}

pub fn url_for(id: TrackId) -> String {
    format!("https://cdn.example.com/tracks/{id}.mp3")
}

/// Controller wired to fakes, with handles to observe them
pub struct Harness {
    pub controller: PlaybackController,
    pub store: PlaybackStore,
    pub resource: FakeResource,
    pub settings: SharedSettings,
}

impl Harness {
    /// Catalog containing 1..=10
    pub fn new(settings: PlaybackSettings) -> Self {
        Self::with_store(PlaybackStore::default(), settings, MapResolver::with_tracks(1..=10))
    }

    pub fn with_store(
        store: PlaybackStore,
        settings: PlaybackSettings,
        resolver: MapResolver,
    ) -> Self {
        Self::with_resolver(store, settings, Arc::new(resolver))
    }

    pub fn with_resolver(
        store: PlaybackStore,
        settings: PlaybackSettings,
        resolver: Arc<dyn TrackResolver>,
    ) -> Self {
        init_tracing();

        let resource = FakeResource::new();
        let settings = SharedSettings::new(settings);
        let controller = PlaybackController::new(
            store.clone(),
            Box::new(resource.clone()),
            resolver,
            Arc::new(settings.clone()),
        );

        Self {
            controller,
            store,
            resource,
            settings,
        }
    }
}

pub fn autoplay(enabled: bool) -> PlaybackSettings {
    PlaybackSettings {
        autoplay: enabled,
        ..PlaybackSettings::default()
    }
}
