/// Channel controllers
///
/// Each channel is a logical playback lane with its own ownership rules:
/// - Background: one looping session, idempotent start
/// - Effect: overlapping fire-and-forget one-shots
/// - Engine: one looping session with volume fades

pub mod background;
pub mod effect;
pub mod engine;

pub use background::BackgroundChannel;
pub use effect::EffectChannel;
pub use engine::EngineChannel;

use std::time::Duration;

use parking_lot::Mutex;

use crate::error::AudioError;

use super::buffer::BufferCache;
use super::context::AudioContext;
use super::effects::PlaybackOptions;
use super::session::PlaybackSession;
use super::source::AssetName;

#[derive(Default)]
struct LoopState {
    current: Option<PlaybackSession>,
    is_playing: bool,
}

/// Single looping session with idempotent start and stop.
///
/// `is_playing` implies `current` holds an active session. The lock is
/// held for the whole of each operation, so start/stop/fade on one
/// channel apply in call order.
pub(crate) struct LoopChannel {
    asset: AssetName,
    volume: f32,
    state: Mutex<LoopState>,
}

impl LoopChannel {
    pub(crate) fn new(asset: AssetName, volume: f32) -> Self {
        Self {
            asset,
            volume: volume.clamp(0.0, 1.0),
            state: Mutex::new(LoopState::default()),
        }
    }

    pub(crate) fn start(
        &self,
        context: &AudioContext,
        cache: &BufferCache,
    ) -> Result<(), AudioError> {
        let mut state = self.state.lock();
        Self::reap(self.asset, &mut state);

        if state.is_playing {
            tracing::debug!("{} already playing", self.asset);
            return Ok(());
        }

        // Leftover from an interrupted start
        if let Some(stale) = state.current.take() {
            stale.stop();
        }

        if let Err(e) = context.resume() {
            tracing::warn!(
                "Audio context resume failed, user interaction may be required: {}",
                e
            );
        }

        let device = context.ensure()?;
        let buffer = cache.get_buffer(context, self.asset)?;
        let session = PlaybackSession::start(
            context.next_session_id(),
            device.as_ref(),
            self.asset,
            buffer,
            PlaybackOptions::for_asset(self.asset, self.volume),
        )?;

        tracing::info!("Playing {} (session {})", self.asset, session.id());
        state.current = Some(session);
        state.is_playing = true;
        Ok(())
    }

    pub(crate) fn stop(&self) {
        let mut state = self.state.lock();
        // Clear the flag before tearing the session down
        state.is_playing = false;
        if let Some(session) = state.current.take() {
            if session.stop() {
                tracing::info!("Stopped {} (session {})", self.asset, session.id());
            }
        }
    }

    pub(crate) fn fade(&self, fraction: f32, duration: Duration) -> bool {
        let mut state = self.state.lock();
        Self::reap(self.asset, &mut state);
        if !state.is_playing {
            tracing::debug!("Ignoring fade on {}: not playing", self.asset);
            return false;
        }
        state
            .current
            .as_ref()
            .map(|session| session.fade(fraction, duration))
            .unwrap_or(false)
    }

    pub(crate) fn is_playing(&self) -> bool {
        let mut state = self.state.lock();
        Self::reap(self.asset, &mut state);
        state.is_playing
    }

    /// Current gain of the live session, if any
    pub(crate) fn current_volume(&self) -> Option<f32> {
        let mut state = self.state.lock();
        Self::reap(self.asset, &mut state);
        state.current.as_ref().map(|session| session.current_volume())
    }

    /// Drop the session if it ended without a stop
    fn reap(asset: AssetName, state: &mut LoopState) {
        let finished = state
            .current
            .as_ref()
            .map(|session| session.is_finished())
            .unwrap_or(false);
        if finished {
            tracing::warn!("{} ended unexpectedly", asset);
            state.current = None;
            state.is_playing = false;
        }
    }
}
