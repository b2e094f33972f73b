/// Background music channel
///
/// At most one looping background session exists at a time. Stop is
/// immediate: the flag drops first, then the session is muted and
/// disconnected.

use crate::audio_system::buffer::BufferCache;
use crate::audio_system::context::AudioContext;
use crate::audio_system::source::AssetName;
use crate::error::AudioError;
use super::LoopChannel;

pub struct BackgroundChannel {
    inner: LoopChannel,
}

impl BackgroundChannel {
    pub fn new(volume: f32) -> Self {
        Self {
            inner: LoopChannel::new(AssetName::Background, volume),
        }
    }

    /// Start the loop unless it is already playing
    pub fn start(&self, context: &AudioContext, cache: &BufferCache) -> Result<(), AudioError> {
        self.inner.start(context, cache)
    }

    /// Stop the loop. No-op when idle.
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    pub fn current_volume(&self) -> Option<f32> {
        self.inner.current_volume()
    }
}
