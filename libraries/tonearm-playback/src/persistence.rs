//! Session persistence for playback state
//!
//! A generic key-value port ([`StateStorage`]) with in-memory and
//! file-backed implementations, the persisted JSON document, and a
//! debouncing [`Persister`] that writes only when the persisted subset
//! actually changed.

use crate::error::{PlaybackError, Result};
use crate::types::{PlayContext, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// The document written to storage
///
/// Exactly these fields survive a reload. Play intent, position,
/// duration and loading flags are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPlayback {
    #[serde(default)]
    pub ids: Vec<TrackId>,
    #[serde(default)]
    pub active_id: Option<TrackId>,
    #[serde(default)]
    pub queue: Vec<TrackId>,
    #[serde(default)]
    pub is_shuffle: bool,
    #[serde(default)]
    pub is_repeat: bool,
    #[serde(default)]
    pub last_context_id: Option<TrackId>,
    #[serde(default)]
    pub play_context: PlayContext,
    #[serde(default)]
    pub play_context_id: Option<String>,
    #[serde(default)]
    pub playback_id: u64,
}

impl PersistedPlayback {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Key-value persistence port
///
/// Implementations decide where documents live (memory for tests, a
/// directory for desktop builds, web storage for browser builds).
pub trait StateStorage: Send + Sync {
    /// Read the document stored under `key`, `None` if absent
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous document
    fn save(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage, mostly for tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    /// Use `directory`, creating it if needed
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !key.starts_with('.');
        if !valid {
            return Err(PlaybackError::Storage(format!("Invalid storage key: {key:?}")));
        }
        Ok(self.directory.join(format!("{key}.json")))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Write-then-rename so a crash never leaves a truncated document
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Debounced writer for one storage key
///
/// `schedule` writes immediately when the debounce window since the last
/// write has passed, otherwise it parks the document as pending. Pending
/// documents go out on [`flush_due`](Self::flush_due) once the window
/// passes, on [`flush`](Self::flush) unconditionally, or when the
/// persister is dropped.
///
/// Timestamps are offsets from any fixed epoch the caller picks; only
/// their differences matter.
pub struct Persister {
    storage: Arc<dyn StateStorage>,
    key: String,
    debounce: Duration,
    last_write: Option<Duration>,
    last_saved: Option<String>,
    pending: Option<String>,
}

impl Persister {
    pub fn new(storage: Arc<dyn StateStorage>, key: impl Into<String>, debounce: Duration) -> Self {
        Self {
            storage,
            key: key.into(),
            debounce,
            last_write: None,
            last_saved: None,
            pending: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and decode the stored document
    ///
    /// A document that fails to decode is logged and treated as absent.
    pub fn load(&mut self) -> Result<Option<PersistedPlayback>> {
        let Some(json) = self.storage.load(&self.key)? else {
            return Ok(None);
        };

        match PersistedPlayback::from_json(&json) {
            Ok(doc) => {
                self.last_saved = Some(json);
                Ok(Some(doc))
            }
            Err(e) => {
                warn!("Ignoring unreadable playback document under {}: {}", self.key, e);
                Ok(None)
            }
        }
    }

    /// Queue `doc` for writing
    ///
    /// Unchanged documents are dropped. Returns whether a write happened.
    pub fn schedule(&mut self, doc: &PersistedPlayback, now: Duration) -> Result<bool> {
        let json = doc.to_json()?;
        if self.last_saved.as_deref() == Some(json.as_str()) {
            self.pending = None;
            return Ok(false);
        }

        if self.window_open(now) {
            self.write(json, now)?;
            Ok(true)
        } else {
            self.pending = Some(json);
            Ok(false)
        }
    }

    /// Write the pending document if the debounce window has passed
    pub fn flush_due(&mut self, now: Duration) -> Result<bool> {
        if self.pending.is_none() || !self.window_open(now) {
            return Ok(false);
        }
        self.flush_at(now)
    }

    /// Write the pending document now
    pub fn flush(&mut self) -> Result<bool> {
        // No clock here; stamp the write at the end of the window it was parked in
        let now = self.last_write.map_or(self.debounce, |last| last + self.debounce);
        self.flush_at(now)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left until the pending document may be written
    ///
    /// `None` when nothing is pending.
    pub fn due_in(&self, now: Duration) -> Option<Duration> {
        self.pending.as_ref()?;
        Some(match self.last_write {
            Some(last) => (last + self.debounce).saturating_sub(now),
            None => Duration::ZERO,
        })
    }

    fn flush_at(&mut self, now: Duration) -> Result<bool> {
        match self.pending.take() {
            Some(json) => {
                self.write(json, now)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn window_open(&self, now: Duration) -> bool {
        match self.last_write {
            Some(last) => now.saturating_sub(last) >= self.debounce,
            None => true,
        }
    }

    fn write(&mut self, json: String, now: Duration) -> Result<()> {
        self.storage.save(&self.key, &json)?;
        debug!("Persisted playback state under {}", self.key);
        self.last_write = Some(now);
        self.last_saved = Some(json);
        self.pending = None;
        Ok(())
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to persist playback state under {} on shutdown: {}", self.key, e);
        }
    }
}

impl std::fmt::Debug for Persister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("key", &self.key)
            .field("debounce", &self.debounce)
            .field("has_pending", &self.pending.is_some())
            .finish()
    }
}
