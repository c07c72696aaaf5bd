//! Playback state: what is playing, what plays next, and why
//!
//! Pure data plus transition functions. No I/O happens here; the
//! [`PlaybackStore`](crate::PlaybackStore) wraps this for observation and
//! persistence and the [`PlaybackController`](crate::PlaybackController)
//! turns it into resource actions.
//!
//! Three sources of ordering compete for "next":
//! 1. the manual queue (always first, FIFO, each entry once)
//! 2. shuffle (uniform random pick from the context list)
//! 3. the context list in natural order, with wrap policy decided by
//!    repeat and autoplay

use crate::persistence::PersistedPlayback;
use crate::queue::ManualQueue;
use crate::types::{PlayContext, TrackId};
use rand::Rng;
use std::time::Duration;

/// Client-local playback state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    /// Context list in its natural order
    ids: Vec<TrackId>,

    /// Track currently loaded or intended to be loaded
    active_id: Option<TrackId>,

    queue: ManualQueue,

    is_shuffle: bool,
    is_repeat: bool,

    /// Most recent identifier activated from `ids` (never from the queue)
    last_context_id: Option<TrackId>,

    play_context: PlayContext,
    play_context_id: Option<String>,

    /// Bumped on every fresh `play(...)` so dependents can remount
    playback_id: u64,

    playing_from_queue: bool,

    /// Intent bit; the controller reconciles the resource against it
    is_playing: bool,

    // Resource-bound, never persisted
    current_time: Duration,
    duration: Option<Duration>,
    is_loading: bool,
}

impl PlaybackState {
    /// Empty state: nothing active, nothing queued, modes off
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Accessors =====

    pub fn ids(&self) -> &[TrackId] {
        &self.ids
    }

    pub fn active_id(&self) -> Option<TrackId> {
        self.active_id
    }

    pub fn queue(&self) -> &ManualQueue {
        &self.queue
    }

    pub fn is_shuffle(&self) -> bool {
        self.is_shuffle
    }

    pub fn is_repeat(&self) -> bool {
        self.is_repeat
    }

    pub fn last_context_id(&self) -> Option<TrackId> {
        self.last_context_id
    }

    pub fn play_context(&self) -> PlayContext {
        self.play_context
    }

    pub fn play_context_id(&self) -> Option<&str> {
        self.play_context_id.as_deref()
    }

    pub fn playback_id(&self) -> u64 {
        self.playback_id
    }

    pub fn playing_from_queue(&self) -> bool {
        self.playing_from_queue
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Last position reported by the resource
    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    /// Duration reported by the resource once metadata loaded
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    // ===== Context =====

    /// Make `id` the active track
    ///
    /// Clears `playing_from_queue`. Leaves the context list and the
    /// queue alone.
    pub fn set_active(&mut self, id: TrackId) {
        self.active_id = Some(id);
        self.playing_from_queue = false;
    }

    /// Replace the context list wholesale
    pub fn set_context_list(&mut self, ids: Vec<TrackId>) {
        self.ids = ids;
    }

    /// Tag the current context list with a semantic label
    pub fn set_context(&mut self, context: PlayContext, context_id: Option<String>) {
        self.play_context = context;
        self.play_context_id = context_id;
    }

    /// Anchor for resuming context order after a queue excursion
    pub fn mark_last_context(&mut self, id: TrackId) {
        self.last_context_id = Some(id);
    }

    /// Start a fresh playback session from a newly displayed listing
    ///
    /// Replaces the context list, activates `active_id`, tags the
    /// context, sets the play intent and bumps `playback_id`.
    pub fn play(
        &mut self,
        ids: Vec<TrackId>,
        active_id: TrackId,
        context: PlayContext,
        context_id: Option<String>,
    ) {
        self.ids = ids;
        self.set_active(active_id);
        self.set_context(context, context_id);
        self.is_playing = true;
        self.playback_id = self.playback_id.wrapping_add(1);

        if self.ids.contains(&active_id) {
            self.mark_last_context(active_id);
        }
    }

    // ===== Manual queue =====

    pub fn enqueue(&mut self, id: TrackId) {
        self.queue.push(id);
    }

    pub fn enqueue_many<I: IntoIterator<Item = TrackId>>(&mut self, ids: I) {
        self.queue.extend(ids);
    }

    /// Shift the queue head. `None` when the queue is empty.
    pub fn dequeue_head(&mut self) -> Option<TrackId> {
        self.queue.pop_front()
    }

    /// Remove the first queued entry equal to `id`
    pub fn remove_from_queue(&mut self, id: TrackId) -> bool {
        self.queue.remove_first(id)
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    // ===== Modes =====

    pub fn toggle_shuffle(&mut self) {
        self.is_shuffle = !self.is_shuffle;
    }

    pub fn toggle_repeat(&mut self) {
        self.is_repeat = !self.is_repeat;
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        self.is_shuffle = enabled;
    }

    pub fn set_repeat(&mut self, enabled: bool) {
        self.is_repeat = enabled;
    }

    // ===== Intent and resource mirror =====

    pub fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn toggle_playing(&mut self) {
        self.is_playing = !self.is_playing;
    }

    pub fn set_current_time(&mut self, position: Duration) {
        self.current_time = position;
    }

    pub fn set_duration(&mut self, duration: Option<Duration>) {
        self.duration = duration;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    // ===== Ordering =====

    /// Index into `ids` that next/previous are computed relative to
    ///
    /// The active track when it came from the context list and is still
    /// in it, otherwise the last context anchor. `None` means "before
    /// the start of the list".
    pub fn reference_index(&self) -> Option<usize> {
        let position = |id: TrackId| self.ids.iter().position(|&candidate| candidate == id);

        if !self.playing_from_queue {
            if let Some(index) = self.active_id.and_then(position) {
                return Some(index);
            }
        }

        self.last_context_id.and_then(position)
    }

    /// Whether context order has nothing left after the reference index
    ///
    /// A queued track that shares an id with the last context entry does
    /// not count; the anchor decides.
    pub fn is_at_context_end(&self) -> bool {
        self.queue.is_empty()
            && !self.ids.is_empty()
            && self.reference_index() == Some(self.ids.len() - 1)
    }

    /// Decide what plays next, using the thread-local RNG for shuffle
    ///
    /// See [`resolve_next_with`](Self::resolve_next_with).
    pub fn resolve_next(&mut self, autoplay: bool) -> Option<TrackId> {
        self.resolve_next_with(autoplay, &mut rand::thread_rng())
    }

    /// Decide what plays next
    ///
    /// First applicable rule wins:
    /// 1. a queued track: shift it and mark `playing_from_queue`, anchoring
    ///    the context-sourced active track first
    /// 2. empty context list: nothing
    /// 3. shuffle: uniform random index, repeats of the current track possible
    /// 4. sequential: one past the reference index; at the end wrap when
    ///    repeat or autoplay is on, otherwise stop
    ///
    /// Consumes a queue entry when one is returned.
    pub fn resolve_next_with<R: Rng + ?Sized>(
        &mut self,
        autoplay: bool,
        rng: &mut R,
    ) -> Option<TrackId> {
        if let Some(head) = self.queue.front() {
            if !self.playing_from_queue {
                if let Some(active) = self.active_id.filter(|id| self.ids.contains(id)) {
                    self.mark_last_context(active);
                }
            }
            self.queue.pop_front();
            self.playing_from_queue = true;
            return Some(head);
        }

        let len = self.ids.len();
        if len == 0 {
            return None;
        }

        let index = if self.is_shuffle {
            rng.gen_range(0..len)
        } else {
            let next = self.reference_index().map_or(0, |index| index + 1);
            if next < len {
                next
            } else if self.is_repeat || autoplay {
                0
            } else {
                return None;
            }
        };

        self.playing_from_queue = false;
        Some(self.ids[index])
    }

    /// Decide what "previous" goes to
    ///
    /// Always drawn from the context list, always sequential (even with
    /// shuffle on) and always wraps at the start. With no reference
    /// index the last entry is chosen.
    pub fn resolve_previous(&self) -> Option<TrackId> {
        let len = self.ids.len();
        if len == 0 {
            return None;
        }

        let index = match self.reference_index() {
            Some(index) => (index + len - 1) % len,
            None => len - 1,
        };

        Some(self.ids[index])
    }

    /// Resolve the next track and make it active
    pub fn activate_next(&mut self, autoplay: bool) -> Option<TrackId> {
        self.activate_next_with(autoplay, &mut rand::thread_rng())
    }

    /// Resolve the next track and make it active, anchoring context picks
    pub fn activate_next_with<R: Rng + ?Sized>(
        &mut self,
        autoplay: bool,
        rng: &mut R,
    ) -> Option<TrackId> {
        let id = self.resolve_next_with(autoplay, rng)?;
        self.active_id = Some(id);
        if !self.playing_from_queue {
            self.mark_last_context(id);
        }
        Some(id)
    }

    /// Resolve the previous track and make it active
    pub fn activate_previous(&mut self) -> Option<TrackId> {
        let id = self.resolve_previous()?;
        self.set_active(id);
        self.mark_last_context(id);
        Some(id)
    }

    // ===== Persistence =====

    /// Persisted subset of this state
    pub fn to_persisted(&self) -> PersistedPlayback {
        PersistedPlayback {
            ids: self.ids.clone(),
            active_id: self.active_id,
            queue: self.queue.to_vec(),
            is_shuffle: self.is_shuffle,
            is_repeat: self.is_repeat,
            last_context_id: self.last_context_id,
            play_context: self.play_context,
            play_context_id: self.play_context_id.clone(),
            playback_id: self.playback_id,
        }
    }

    /// Whether `self` and `other` would persist the same document
    pub fn persisted_eq(&self, other: &Self) -> bool {
        self.ids == other.ids
            && self.active_id == other.active_id
            && self.queue == other.queue
            && self.is_shuffle == other.is_shuffle
            && self.is_repeat == other.is_repeat
            && self.last_context_id == other.last_context_id
            && self.play_context == other.play_context
            && self.play_context_id == other.play_context_id
            && self.playback_id == other.playback_id
    }

    /// Rebuild state from a persisted document
    ///
    /// Everything outside the persisted subset starts from its safe
    /// default, so a reload never starts audio on its own.
    pub fn from_persisted(doc: PersistedPlayback) -> Self {
        Self {
            ids: doc.ids,
            active_id: doc.active_id,
            queue: doc.queue.into_iter().collect(),
            is_shuffle: doc.is_shuffle,
            is_repeat: doc.is_repeat,
            last_context_id: doc.last_context_id,
            play_context: doc.play_context,
            play_context_id: doc.play_context_id,
            playback_id: doc.playback_id,
            ..Self::default()
        }
    }
}
