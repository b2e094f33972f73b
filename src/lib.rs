//! Audio engine for the solar-system explorer.
//!
//! Mixes a looping background track, overlapping UI one-shots and a
//! fadeable rocket engine drone through one shared output, with
//! idempotent start/stop and strict cleanup on every exit path.

pub mod audio_system;
pub mod config;
pub mod error;

pub use audio_system::{AssetName, AudioEngine, ContextState};
pub use config::{AudioConfig, SoundConfig};
pub use error::{AudioError, ConfigError};
