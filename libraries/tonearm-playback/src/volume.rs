//! Volume control
//!
//! Linear volume in `[0, 1]` as media elements expect it, with a mute
//! flag that preserves the level.

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Loudest setting, used when volume is not remembered across tracks
    pub const MAX: f32 = 1.0;

    /// Create new volume controller
    pub fn new(level: f32) -> Self {
        Self {
            level: Self::sanitize(level),
            muted: false,
        }
    }

    /// Set volume level (0.0-1.0)
    pub fn set_level(&mut self, level: f32) {
        self.level = Self::sanitize(level);
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Back to full volume
    pub fn reset(&mut self) {
        self.level = Self::MAX;
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute audio (restores previous volume)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Value to hand the media resource
    ///
    /// Returns 0.0 if muted, otherwise the level
    pub fn output(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }

    /// Level as a 0-100 percentage for display
    pub fn percent(&self) -> u8 {
        (self.level * 100.0).round() as u8
    }

    fn sanitize(level: f32) -> f32 {
        if level.is_nan() {
            Self::MAX
        } else {
            level.clamp(0.0, Self::MAX)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(Self::MAX)
    }
}
