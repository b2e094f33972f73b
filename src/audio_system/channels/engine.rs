/// Rocket engine drone channel
///
/// Same start/stop shape as the background channel, plus fades for
/// throttling the drone up or down during launch and landing sequences.

use std::time::Duration;

use crate::audio_system::buffer::BufferCache;
use crate::audio_system::context::AudioContext;
use crate::audio_system::source::AssetName;
use crate::error::AudioError;
use super::LoopChannel;

pub struct EngineChannel {
    inner: LoopChannel,
}

impl EngineChannel {
    pub fn new(volume: f32) -> Self {
        Self {
            inner: LoopChannel::new(AssetName::Engine, volume),
        }
    }

    /// Start the drone. Repeated triggers never layer a second drone.
    pub fn start(&self, context: &AudioContext, cache: &BufferCache) -> Result<(), AudioError> {
        self.inner.start(context, cache)
    }

    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Ramp to `fraction` of the engine's base volume over `duration`.
    /// Returns false when nothing is playing.
    pub fn fade(&self, fraction: f32, duration: Duration) -> bool {
        self.inner.fade(fraction, duration)
    }

    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    pub fn current_volume(&self) -> Option<f32> {
        self.inner.current_volume()
    }
}
