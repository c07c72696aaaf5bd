//! Settings collaborator
//!
//! The playback core only reads these; a separate settings component
//! owns them.

use crate::config::PlaybackSettings;
use std::sync::{Arc, PoisonError, RwLock};

/// Read access to the user settings that shape terminal-track policy
pub trait SettingsSource: Send + Sync {
    /// Continue from the start of the context when it runs out
    fn autoplay(&self) -> bool;

    /// Keep the user's volume across track changes
    fn remember_volume(&self) -> bool;

    /// Current volume in `[0, 1]`
    fn volume(&self) -> f32;
}

impl SettingsSource for PlaybackSettings {
    fn autoplay(&self) -> bool {
        self.autoplay
    }

    fn remember_volume(&self) -> bool {
        self.remember_volume
    }

    fn volume(&self) -> f32 {
        self.volume.clamp(0.0, 1.0)
    }
}

/// Settings that can change while the controller runs
///
/// Cheap to clone; clones share the same values.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<PlaybackSettings>>,
}

impl SharedSettings {
    pub fn new(settings: PlaybackSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Current values
    pub fn get(&self) -> PlaybackSettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_autoplay(&self, enabled: bool) {
        self.write(|settings| settings.autoplay = enabled);
    }

    pub fn set_remember_volume(&self, enabled: bool) {
        self.write(|settings| settings.remember_volume = enabled);
    }

    pub fn set_volume(&self, volume: f32) {
        self.write(|settings| settings.volume = volume.clamp(0.0, 1.0));
    }

    fn write(&self, f: impl FnOnce(&mut PlaybackSettings)) {
        f(&mut self.inner.write().unwrap_or_else(PoisonError::into_inner));
    }
}

impl SettingsSource for SharedSettings {
    fn autoplay(&self) -> bool {
        self.get().autoplay
    }

    fn remember_volume(&self) -> bool {
        self.get().remember_volume
    }

    fn volume(&self) -> f32 {
        self.get().volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_settings_are_visible_through_clones() {
        let settings = SharedSettings::new(PlaybackSettings::default());
        let handle = settings.clone();

        handle.set_autoplay(false);
        handle.set_volume(1.7);

        assert!(!settings.autoplay());
        assert_eq!(settings.volume(), 1.0);
    }
}
