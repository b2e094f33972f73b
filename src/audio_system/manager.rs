/// Audio engine
///
/// The explicitly constructed owner of the shared context, the buffer
/// cache and the three channels. UI event handlers call into it through
/// a small function-call surface; apart from the first background start
/// failure, nothing here reports an error to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::AudioConfig;
use crate::error::AudioError;

use super::assets::{AssetSource, DirAssets};
use super::buffer::BufferCache;
use super::channels::{BackgroundChannel, EffectChannel, EngineChannel};
use super::context::{AudioBackend, AudioContext, ContextState, RodioBackend};
use super::source::AssetName;

pub struct AudioEngine {
    context: AudioContext,
    cache: BufferCache,
    background: BackgroundChannel,
    effects: EffectChannel,
    engine: EngineChannel,
    click_volume: f32,
    hover_volume: f32,
    background_failure_reported: AtomicBool,
}

impl AudioEngine {
    /// Create an engine; no device is opened until the first sound plays
    pub fn new(
        backend: impl AudioBackend + 'static,
        assets: impl AssetSource + 'static,
        config: &AudioConfig,
    ) -> Self {
        Self {
            context: AudioContext::new(backend),
            cache: BufferCache::new(assets),
            background: BackgroundChannel::new(config.background.volume),
            effects: EffectChannel::new(),
            engine: EngineChannel::new(config.engine.volume),
            click_volume: config.click.volume,
            hover_volume: config.hover.volume,
            background_failure_reported: AtomicBool::new(false),
        }
    }

    /// Engine playing through the default rodio output, reading sound
    /// files from the configured asset directory
    pub fn with_default_output(config: &AudioConfig) -> Self {
        Self::new(RodioBackend, DirAssets::from_config(config), config)
    }

    /// Start the background loop.
    ///
    /// The first failure is returned so the UI can ask for a user
    /// gesture; later failures are only logged.
    pub fn play_background(&self) -> Result<(), AudioError> {
        match self.background.start(&self.context, &self.cache) {
            Ok(()) => Ok(()),
            Err(e) => {
                if !self.background_failure_reported.swap(true, Ordering::AcqRel) {
                    tracing::warn!("Background music unavailable: {}", e);
                    Err(e)
                } else {
                    tracing::warn!("Error playing background music: {}", e);
                    Ok(())
                }
            }
        }
    }

    pub fn stop_background(&self) {
        self.background.stop();
    }

    pub fn background_state(&self) -> bool {
        self.background.is_playing()
    }

    pub fn play_click(&self) {
        self.effects
            .play_one_shot(&self.context, &self.cache, AssetName::Click, self.click_volume);
    }

    pub fn play_hover(&self) {
        self.effects
            .play_one_shot(&self.context, &self.cache, AssetName::Hover, self.hover_volume);
    }

    /// Start the engine drone; no-op when it is already running
    pub fn play_engine(&self) {
        if let Err(e) = self.engine.start(&self.context, &self.cache) {
            tracing::warn!("Error playing engine sound: {}", e);
        }
    }

    pub fn stop_engine(&self) {
        self.engine.stop();
    }

    /// Ramp the drone to `volume_fraction` of its base volume
    pub fn fade_engine(&self, volume_fraction: f32, duration_ms: u64) {
        self.engine
            .fade(volume_fraction, Duration::from_millis(duration_ms));
    }

    pub fn is_engine_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// Stop background, engine and every one-shot still sounding
    pub fn stop_all(&self) {
        self.background.stop();
        self.engine.stop();
        self.effects.stop_all();
        tracing::debug!("Stopped all audio channels");
    }

    /// Decode every asset ahead of time; returns how many are ready
    pub fn preload(&self) -> usize {
        let ready = self.cache.preload(&self.context, &AssetName::ALL);
        tracing::info!("Preloaded {}/{} audio assets", ready, AssetName::ALL.len());
        ready
    }

    /// Silence everything and release the output device
    pub fn shutdown(&self) {
        self.stop_all();
        self.context.close();
    }

    pub fn context_state(&self) -> ContextState {
        self.context.state()
    }

    pub fn active_effects(&self) -> usize {
        self.effects.active_count()
    }

    pub fn background_volume(&self) -> Option<f32> {
        self.background.current_volume()
    }

    pub fn engine_volume(&self) -> Option<f32> {
        self.engine.current_volume()
    }

    pub fn buffer_cache(&self) -> &BufferCache {
        &self.cache
    }
}
