//! Player configuration

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,
}

/// User settings read by the controller
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,

    #[serde(default)]
    pub remember_volume: bool,

    #[serde(default = "default_volume")]
    pub volume: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PersistenceSettings {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Directory for the file-backed store; in-memory when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl PersistenceSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl PlayerConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Environment variables use the `TONEARM_` prefix and `__` between
    /// section and key, e.g. `TONEARM_PLAYBACK__AUTOPLAY=false`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = ::config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                settings = settings.add_source(::config::File::from(path));
            }
        }

        settings = settings.add_source(
            ::config::Environment::with_prefix("TONEARM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.persistence.storage_key.trim().is_empty() {
            return Err(PlaybackError::Config(
                "Storage key must not be empty".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.playback.volume) {
            return Err(PlaybackError::Config(format!(
                "Volume must be between 0 and 1, got {}",
                self.playback.volume
            )));
        }

        Ok(())
    }
}

// Default values
fn default_autoplay() -> bool {
    true
}

fn default_volume() -> f32 {
    1.0
}

fn default_storage_key() -> String {
    "tonearm.playback".to_string()
}

fn default_debounce_ms() -> u64 {
    250
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            autoplay: default_autoplay(),
            remember_volume: false,
            volume: default_volume(),
        }
    }
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            debounce_ms: default_debounce_ms(),
            directory: None,
        }
    }
}
