//! WASM-compatible PlaybackStore wrapper

use super::storage::WebStorage;
use crate::config::PersistenceSettings;
use crate::{PlayContext, PlaybackStore, TrackId};
use js_sys::Function;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// WASM-compatible playback store
///
/// Wraps the core store with a JavaScript-friendly API. Every mutation
/// calls the registered change callback with no arguments; the page then
/// reads whatever getters it needs.
#[wasm_bindgen]
pub struct WasmPlaybackStore {
    inner: PlaybackStore,
    autoplay: bool,
    on_change: Option<Function>,
}

#[wasm_bindgen]
impl WasmPlaybackStore {
    /// Create a store persisted in `sessionStorage`
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let settings = PersistenceSettings::default();
        Self {
            inner: PlaybackStore::with_persistence(
                Arc::new(WebStorage::session()),
                settings.storage_key.clone(),
                settings.debounce(),
            ),
            autoplay: true,
            on_change: None,
        }
    }

    /// Register the change callback
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: Function) {
        self.on_change = Some(callback);
    }

    /// Mirror of the user's autoplay setting, consulted by `resolveNext`
    #[wasm_bindgen(js_name = setAutoplay)]
    pub fn set_autoplay(&mut self, enabled: bool) {
        self.autoplay = enabled;
    }

    // ===== Commands =====

    /// Start a fresh playback session from a listing
    pub fn play(
        &mut self,
        ids: Vec<TrackId>,
        active_id: TrackId,
        context: Option<String>,
        context_id: Option<String>,
    ) {
        let context = context
            .as_deref()
            .and_then(PlayContext::from_str)
            .unwrap_or_default();
        self.inner.play(ids, active_id, context, context_id);
        self.emit_change();
    }

    #[wasm_bindgen(js_name = setActive)]
    pub fn set_active(&mut self, id: TrackId) {
        self.inner.set_active(id);
        self.emit_change();
    }

    #[wasm_bindgen(js_name = setPlaying)]
    pub fn set_playing(&mut self, playing: bool) {
        self.inner.set_playing(playing);
        self.emit_change();
    }

    pub fn enqueue(&mut self, id: TrackId) {
        self.inner.enqueue(id);
        self.emit_change();
    }

    #[wasm_bindgen(js_name = enqueueMany)]
    pub fn enqueue_many(&mut self, ids: Vec<TrackId>) {
        self.inner.enqueue_many(ids);
        self.emit_change();
    }

    #[wasm_bindgen(js_name = removeFromQueue)]
    pub fn remove_from_queue(&mut self, id: TrackId) -> bool {
        let removed = self.inner.remove_from_queue(id);
        self.emit_change();
        removed
    }

    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&mut self) {
        self.inner.toggle_shuffle();
        self.emit_change();
    }

    #[wasm_bindgen(js_name = toggleRepeat)]
    pub fn toggle_repeat(&mut self) {
        self.inner.toggle_repeat();
        self.emit_change();
    }

    /// Advance and activate; `undefined` when nothing follows
    #[wasm_bindgen(js_name = playNext)]
    pub fn play_next(&mut self) -> Option<TrackId> {
        let autoplay = self.autoplay;
        let next = self.inner.update(|state| state.activate_next(autoplay));
        self.emit_change();
        next
    }

    #[wasm_bindgen(js_name = playPrevious)]
    pub fn play_previous(&mut self) -> Option<TrackId> {
        let previous = self.inner.update(|state| state.activate_previous());
        self.emit_change();
        previous
    }

    /// Write any pending state to storage now
    pub fn flush(&self) -> Result<(), JsValue> {
        self.inner
            .flush()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // ===== State Queries =====

    #[wasm_bindgen(js_name = activeId)]
    pub fn active_id(&self) -> Option<TrackId> {
        self.inner.read(|state| state.active_id())
    }

    pub fn ids(&self) -> Vec<TrackId> {
        self.inner.read(|state| state.ids().to_vec())
    }

    pub fn queue(&self) -> Vec<TrackId> {
        self.inner.read(|state| state.queue().to_vec())
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.read(|state| state.is_playing())
    }

    #[wasm_bindgen(js_name = isShuffle)]
    pub fn is_shuffle(&self) -> bool {
        self.inner.read(|state| state.is_shuffle())
    }

    #[wasm_bindgen(js_name = isRepeat)]
    pub fn is_repeat(&self) -> bool {
        self.inner.read(|state| state.is_repeat())
    }

    #[wasm_bindgen(js_name = playContext)]
    pub fn play_context(&self) -> String {
        self.inner.read(|state| state.play_context().as_str().to_string())
    }

    #[wasm_bindgen(js_name = playContextId)]
    pub fn play_context_id(&self) -> Option<String> {
        self.inner
            .read(|state| state.play_context_id().map(str::to_string))
    }

    #[wasm_bindgen(js_name = playbackId)]
    pub fn playback_id(&self) -> f64 {
        self.inner.read(|state| state.playback_id() as f64)
    }

    #[wasm_bindgen(js_name = playingFromQueue)]
    pub fn playing_from_queue(&self) -> bool {
        self.inner.read(|state| state.playing_from_queue())
    }

    fn emit_change(&self) {
        self.inner.flush_due();
        self.arm_trailing_write();
        if let Some(callback) = &self.on_change {
            if let Err(e) = callback.call0(&JsValue::NULL) {
                web_sys::console::error_1(&e);
            }
        }
    }
}

impl WasmPlaybackStore {
    /// Write a debounced document once its window passes, even if the page goes quiet
    fn arm_trailing_write(&self) {
        let Some(delay) = self.inner.pending_write_in() else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };

        let store = self.inner.clone();
        let callback = Closure::once_into_js(move || {
            if let Err(e) = store.flush() {
                web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
            }
        });

        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            web_sys::console::error_1(&e);
        }
    }
}

impl Default for WasmPlaybackStore {
    fn default() -> Self {
        Self::new()
    }
}
