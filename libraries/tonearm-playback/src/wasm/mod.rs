//! WASM bindings for tonearm-playback
//!
//! Browser builds persist playback state in web storage and drive the
//! store from JavaScript. The controller stays on the host side; the
//! page's `<audio>` element plays the role of the media resource.

#[cfg(feature = "wasm")]
pub mod storage;

#[cfg(feature = "wasm")]
pub mod store;

#[cfg(feature = "wasm")]
pub use storage::{WebStorage, WebStorageArea};

#[cfg(feature = "wasm")]
pub use store::WasmPlaybackStore;
