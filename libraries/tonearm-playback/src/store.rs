//! Observable, persisted container for [`PlaybackState`]
//!
//! The store is an explicitly owned handle passed to the controller and
//! to UI subscribers. Every mutation goes through [`PlaybackStore::update`],
//! which publishes the new snapshot to `watch` subscribers and hands the
//! persisted subset to the debouncing [`Persister`].
//!
//! A document parked inside the debounce window is written by a trailing
//! timer task when a tokio runtime is available, and in any case when the
//! last handle is dropped. Browser builds arm their own timer through
//! [`PlaybackStore::pending_write_in`].

use crate::config::PersistenceSettings;
use crate::error::Result;
use crate::persistence::{FileStorage, MemoryStorage, Persister, StateStorage};
use crate::state::PlaybackState;
use crate::types::{PlayContext, TrackId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

struct Shared {
    state: PlaybackState,
    persister: Option<Persister>,
    // A trailing write task is already waiting
    flush_armed: bool,
}

/// Time source for the debouncer
#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
fn clock() -> Duration {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed()
}

/// Time source for the debouncer
///
/// `std::time::Instant` panics in the browser.
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
fn clock() -> Duration {
    Duration::from_secs_f64(js_sys::Date::now() / 1000.0)
}

/// Cloneable handle to the playback state
///
/// Clones share the same state, subscribers and persister.
#[derive(Clone)]
pub struct PlaybackStore {
    shared: Arc<Mutex<Shared>>,
    tx: Arc<watch::Sender<PlaybackState>>,
}

impl PlaybackStore {
    /// In-memory store without persistence
    pub fn new(state: PlaybackState) -> Self {
        Self::build(state, None)
    }

    /// Store restored from `storage` and saved back to it on mutation
    ///
    /// An absent, unreadable or corrupt document starts from an empty
    /// state rather than failing.
    pub fn with_persistence(
        storage: Arc<dyn StateStorage>,
        key: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        let mut persister = Persister::new(storage, key, debounce);

        let state = match persister.load() {
            Ok(Some(doc)) => {
                info!("Restored playback state from {}", persister.key());
                PlaybackState::from_persisted(doc)
            }
            Ok(None) => PlaybackState::new(),
            Err(e) => {
                warn!("Failed to load playback state from {}: {}", persister.key(), e);
                PlaybackState::new()
            }
        };

        Self::build(state, Some(persister))
    }

    /// Store persisted as the configuration describes
    ///
    /// Uses a [`FileStorage`] in the configured directory, or memory when
    /// no directory is set.
    pub fn from_config(settings: &PersistenceSettings) -> Result<Self> {
        let storage: Arc<dyn StateStorage> = match &settings.directory {
            Some(directory) => Arc::new(FileStorage::new(directory)?),
            None => Arc::new(MemoryStorage::new()),
        };

        Ok(Self::with_persistence(
            storage,
            settings.storage_key.clone(),
            settings.debounce(),
        ))
    }

    fn build(state: PlaybackState, persister: Option<Persister>) -> Self {
        let (tx, _rx) = watch::channel(state.clone());
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state,
                persister,
                flush_armed: false,
            })),
            tx: Arc::new(tx),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receiver that always holds the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.tx.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PlaybackState {
        self.lock().state.clone()
    }

    /// Read from the current state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&PlaybackState) -> R) -> R {
        f(&self.lock().state)
    }

    /// Apply a transition, then publish and persist
    ///
    /// `f` runs under the store lock and must not call back into the store.
    /// Changes outside the persisted subset (position ticks, loading, play
    /// intent) are published but never reach the persister.
    pub fn update<R>(&self, f: impl FnOnce(&mut PlaybackState) -> R) -> R {
        let mut shared = self.lock();
        let result = f(&mut shared.state);

        // The channel always holds the last published state
        let persisted_changed = {
            let published = self.tx.borrow();
            if *published == shared.state {
                return result;
            }
            !published.persisted_eq(&shared.state)
        };

        if persisted_changed {
            let doc = shared.state.to_persisted();
            if let Some(persister) = shared.persister.as_mut() {
                if let Err(e) = persister.schedule(&doc, clock()) {
                    warn!("Failed to persist playback state: {}", e);
                }
            }
            self.arm_trailing_flush(&mut shared);
        }

        self.tx.send_replace(shared.state.clone());
        result
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn arm_trailing_flush(&self, shared: &mut Shared) {
        if shared.flush_armed {
            return;
        }
        let Some(delay) = shared.persister.as_ref().and_then(|p| p.due_in(clock())) else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, pending playback state waits for the next flush");
            return;
        };

        shared.flush_armed = true;
        let weak = Arc::downgrade(&self.shared);
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
            shared.flush_armed = false;
            if let Some(persister) = shared.persister.as_mut() {
                if let Err(e) = persister.flush() {
                    warn!("Failed to persist playback state: {}", e);
                }
            }
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn arm_trailing_flush(&self, _shared: &mut Shared) {}

    /// Time until a parked document becomes due, `None` if nothing is parked
    pub fn pending_write_in(&self) -> Option<Duration> {
        self.lock()
            .persister
            .as_ref()
            .and_then(|persister| persister.due_in(clock()))
    }

    /// Write any debounced document whose window has passed
    pub fn flush_due(&self) {
        let mut shared = self.lock();
        if let Some(persister) = shared.persister.as_mut() {
            if let Err(e) = persister.flush_due(clock()) {
                warn!("Failed to persist playback state: {}", e);
            }
        }
    }

    /// Write any pending document now
    pub fn flush(&self) -> Result<()> {
        let mut shared = self.lock();
        if let Some(persister) = shared.persister.as_mut() {
            persister.flush()?;
        }
        Ok(())
    }

    // ===== Transition shorthands =====

    pub fn play(
        &self,
        ids: Vec<TrackId>,
        active_id: TrackId,
        context: PlayContext,
        context_id: Option<String>,
    ) {
        self.update(|state| state.play(ids, active_id, context, context_id));
    }

    pub fn set_active(&self, id: TrackId) {
        self.update(|state| state.set_active(id));
    }

    pub fn set_context_list(&self, ids: Vec<TrackId>) {
        self.update(|state| state.set_context_list(ids));
    }

    pub fn set_context(&self, context: PlayContext, context_id: Option<String>) {
        self.update(|state| state.set_context(context, context_id));
    }

    pub fn enqueue(&self, id: TrackId) {
        self.update(|state| state.enqueue(id));
    }

    pub fn enqueue_many(&self, ids: Vec<TrackId>) {
        self.update(|state| state.enqueue_many(ids));
    }

    pub fn dequeue_head(&self) -> Option<TrackId> {
        self.update(PlaybackState::dequeue_head)
    }

    pub fn remove_from_queue(&self, id: TrackId) -> bool {
        self.update(|state| state.remove_from_queue(id))
    }

    pub fn clear_queue(&self) {
        self.update(PlaybackState::clear_queue);
    }

    pub fn toggle_shuffle(&self) {
        self.update(PlaybackState::toggle_shuffle);
    }

    pub fn toggle_repeat(&self) {
        self.update(PlaybackState::toggle_repeat);
    }

    pub fn mark_last_context(&self, id: TrackId) {
        self.update(|state| state.mark_last_context(id));
    }

    pub fn set_playing(&self, playing: bool) {
        self.update(|state| state.set_playing(playing));
    }

    pub fn resolve_next(&self, autoplay: bool) -> Option<TrackId> {
        self.update(|state| state.resolve_next(autoplay))
    }

    pub fn resolve_previous(&self) -> Option<TrackId> {
        self.read(PlaybackState::resolve_previous)
    }
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new(PlaybackState::new())
    }
}

impl std::fmt::Debug for PlaybackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackStore")
            .field("state", &self.lock().state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_mutations() {
        let store = PlaybackStore::default();
        let mut rx = store.subscribe();

        store.play(vec![1, 2], 1, PlayContext::Home, None);

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.active_id(), Some(1));
        assert!(seen.is_playing());
    }

    #[test]
    fn noop_update_does_not_notify() {
        let store = PlaybackStore::default();
        let rx = store.subscribe();

        assert_eq!(store.dequeue_head(), None);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn position_ticks_publish_without_persisting() {
        let storage = Arc::new(MemoryStorage::new());
        let store = PlaybackStore::with_persistence(storage.clone(), "k", Duration::ZERO);
        store.play(vec![1, 2], 1, PlayContext::Home, None);
        storage.remove("k").unwrap();

        let rx = store.subscribe();
        store.update(|state| state.set_current_time(Duration::from_secs(4)));

        assert!(rx.has_changed().unwrap());
        assert!(storage.is_empty());
    }

    #[test]
    fn clones_share_state() {
        let store = PlaybackStore::default();
        let other = store.clone();

        other.enqueue(5);
        assert_eq!(store.snapshot().queue().to_vec(), vec![5]);
    }

    #[test]
    fn restores_from_storage() {
        let storage: Arc<dyn StateStorage> = Arc::new(MemoryStorage::new());

        let store = PlaybackStore::with_persistence(storage.clone(), "k", Duration::ZERO);
        store.play(vec![3, 4], 4, PlayContext::Liked, None);
        store.enqueue(9);
        store.flush().unwrap();

        let reloaded = PlaybackStore::with_persistence(storage, "k", Duration::ZERO);
        let state = reloaded.snapshot();
        assert_eq!(state.ids(), &[3, 4]);
        assert_eq!(state.active_id(), Some(4));
        assert_eq!(state.queue().to_vec(), vec![9]);
        assert!(!state.is_playing());
    }

    #[test]
    fn from_config_uses_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PersistenceSettings {
            directory: Some(dir.path().to_path_buf()),
            debounce_ms: 0,
            ..Default::default()
        };

        let store = PlaybackStore::from_config(&settings).unwrap();
        store.play(vec![1], 1, PlayContext::Search, Some("query".to_string()));
        store.flush().unwrap();

        assert!(dir.path().join("tonearm.playback.json").exists());
    }
}
