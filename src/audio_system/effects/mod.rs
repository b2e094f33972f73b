/// Playback effects
///
/// Per-session playback options and the gain parameter that carries
/// volume and fades.

pub mod fade;

pub use fade::{duration_to_frames, GainParam, GainState, Ramp};

use super::source::AssetName;

/// Options applied when a session starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    /// Restart from the beginning when the buffer ends
    pub looping: bool,

    /// Base volume multiplier (0.0-1.0); fades are relative to it
    pub volume: f32,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            looping: false,
            volume: 1.0,
        }
    }
}

impl PlaybackOptions {
    /// Single pass at `volume`
    pub fn one_shot(volume: f32) -> Self {
        Self::default().with_volume(volume)
    }

    /// Endless loop at `volume`
    pub fn looped(volume: f32) -> Self {
        Self::default().with_loop(true).with_volume(volume)
    }

    /// Options for `asset` at `volume`, looping if the asset loops
    pub fn for_asset(asset: AssetName, volume: f32) -> Self {
        if asset.is_looping() {
            Self::looped(volume)
        } else {
            Self::one_shot(volume)
        }
    }

    /// Set loop flag
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }
}
