/// Audio system module
///
/// Provides the audio engine behind the solar-system explorer:
/// - One looping background track
/// - Overlapping click/hover one-shots
/// - A looping rocket engine drone with smooth fades
///
/// ## Architecture
///
/// ```text
/// AudioEngine
///   ├── AudioContext       shared output, opened lazily, resumed on demand
///   ├── BufferCache        decodes each asset once
///   ├── BackgroundChannel  ─┐
///   ├── EffectChannel      ─┤ PlaybackSession: source -> gain -> output
///   └── EngineChannel      ─┘
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use solar_audio::{AudioConfig, AudioEngine};
///
/// let config = AudioConfig::default();
/// let engine = AudioEngine::with_default_output(&config);
///
/// // Surface the first failure so the UI can ask for a click
/// if engine.play_background().is_err() {
///     show_enable_sound_prompt();
/// }
///
/// engine.play_click();
///
/// // Launch sequence
/// engine.play_engine();
/// engine.fade_engine(0.3, 1500);
/// engine.stop_engine();
/// ```

pub mod assets;
pub mod buffer;
pub mod channels;
pub mod context;
pub mod effects;
pub mod manager;
pub mod offline;
pub mod session;
pub mod source;

// Re-export commonly used types
pub use assets::{AssetSource, DirAssets, MemoryAssets};
pub use buffer::{BufferCache, DecodedBuffer};
pub use channels::{BackgroundChannel, EffectChannel, EngineChannel};
pub use context::{
    AudioBackend, AudioContext, ContextState, OutputDevice, RodioBackend, SessionId,
};
pub use effects::{GainParam, PlaybackOptions, Ramp};
pub use manager::AudioEngine;
pub use offline::{OfflineBackend, OfflineDevice};
pub use session::{PlaybackSession, SessionSource};
pub use source::AssetName;
