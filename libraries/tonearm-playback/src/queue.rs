//! Manual play queue
//!
//! Tracks the user explicitly queued. Always drained before the
//! context list is consulted, in FIFO order, each entry exactly once.

use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// FIFO of user-queued identifiers
///
/// ```text
/// Currently Playing: 4 (from context)
/// ─────────────────────────────
/// Manual queue (plays next):
///   - 9
///   - 12
/// ─────────────────────────────
/// Context list resumes after 4
/// ```
///
/// Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManualQueue {
    tracks: VecDeque<TrackId>,
}

impl ManualQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail
    pub fn push(&mut self, id: TrackId) {
        self.tracks.push_back(id);
    }

    /// Append several identifiers, preserving their order
    pub fn extend<I: IntoIterator<Item = TrackId>>(&mut self, ids: I) {
        self.tracks.extend(ids);
    }

    /// Remove and return the head
    pub fn pop_front(&mut self) -> Option<TrackId> {
        self.tracks.pop_front()
    }

    /// Peek at the head without removing it
    pub fn front(&self) -> Option<TrackId> {
        self.tracks.front().copied()
    }

    /// Remove the first entry equal to `id`
    ///
    /// Later duplicates and the relative order of everything else are
    /// left untouched. Returns whether anything was removed.
    pub fn remove_first(&mut self, id: TrackId) -> bool {
        match self.tracks.iter().position(|&queued| queued == id) {
            Some(index) => {
                self.tracks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Queued identifiers, head first
    pub fn iter(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.tracks.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<TrackId> {
        self.tracks.iter().copied().collect()
    }
}

impl FromIterator<TrackId> for ManualQueue {
    fn from_iter<I: IntoIterator<Item = TrackId>>(iter: I) -> Self {
        Self {
            tracks: iter.into_iter().collect(),
        }
    }
}
