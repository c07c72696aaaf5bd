//! Web Storage backend for the persistence port

use crate::error::{PlaybackError, Result};
use crate::persistence::StateStorage;
use wasm_bindgen::JsValue;

/// Which browser storage area to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebStorageArea {
    /// Cleared when the tab closes; the default for playback state
    Session,
    Local,
}

/// `sessionStorage` / `localStorage` as a [`StateStorage`]
///
/// Holds no JS handles, the storage object is looked up per call.
#[derive(Debug, Clone, Copy)]
pub struct WebStorage {
    area: WebStorageArea,
}

impl WebStorage {
    pub fn session() -> Self {
        Self {
            area: WebStorageArea::Session,
        }
    }

    pub fn local() -> Self {
        Self {
            area: WebStorageArea::Local,
        }
    }

    fn storage(&self) -> Result<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| PlaybackError::Storage("No window available".to_string()))?;

        let storage = match self.area {
            WebStorageArea::Session => window.session_storage(),
            WebStorageArea::Local => window.local_storage(),
        };

        storage
            .map_err(js_error)?
            .ok_or_else(|| PlaybackError::Storage("Web storage is disabled".to_string()))
    }
}

impl StateStorage for WebStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage()?.remove_item(key).map_err(js_error)
    }
}

fn js_error(value: JsValue) -> PlaybackError {
    PlaybackError::Storage(format!("{value:?}"))
}
