/// One-shot effect channel
///
/// Every request starts a brand-new session; overlapping clicks and
/// hovers are intended. Sessions are kept in a registry only so a global
/// stop can silence stragglers; finished ones are pruned on each call.

use parking_lot::Mutex;

use crate::audio_system::buffer::BufferCache;
use crate::audio_system::context::AudioContext;
use crate::audio_system::effects::PlaybackOptions;
use crate::audio_system::session::PlaybackSession;
use crate::audio_system::source::AssetName;
use crate::error::AudioError;

#[derive(Default)]
pub struct EffectChannel {
    active: Mutex<Vec<PlaybackSession>>,
}

impl EffectChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire a one-shot. Failures are logged and swallowed.
    pub fn play_one_shot(
        &self,
        context: &AudioContext,
        cache: &BufferCache,
        asset: AssetName,
        volume: f32,
    ) {
        match self.try_play(context, cache, asset, volume) {
            Ok(session) => {
                let mut active = self.active.lock();
                active.retain(|session| !session.is_finished());
                active.push(session);
            }
            Err(e) => tracing::warn!("Error playing {} sound: {}", asset, e),
        }
    }

    fn try_play(
        &self,
        context: &AudioContext,
        cache: &BufferCache,
        asset: AssetName,
        volume: f32,
    ) -> Result<PlaybackSession, AudioError> {
        if let Err(e) = context.resume() {
            tracing::warn!("Audio context resume failed before {}: {}", asset, e);
        }
        let device = context.ensure()?;
        let buffer = cache.get_buffer(context, asset)?;
        PlaybackSession::start(
            context.next_session_id(),
            device.as_ref(),
            asset,
            buffer,
            PlaybackOptions::for_asset(asset, volume),
        )
    }

    /// Stop every one-shot still sounding
    pub fn stop_all(&self) -> usize {
        let sessions: Vec<PlaybackSession> = self.active.lock().drain(..).collect();
        let stopped = sessions.iter().filter(|session| session.stop()).count();
        if stopped > 0 {
            tracing::debug!("Stopped {} effect sessions", stopped);
        }
        stopped
    }

    /// One-shots that have not finished yet
    pub fn active_count(&self) -> usize {
        let mut active = self.active.lock();
        active.retain(|session| !session.is_finished());
        active.len()
    }
}
