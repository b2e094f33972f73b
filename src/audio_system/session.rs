/// Playback sessions
///
/// A session is one live instance of a sound: a buffer source feeding a
/// gain stage connected to the output. `PlaybackSession` is the handle
/// owned by a channel controller; `SessionSource` is the half that lives
/// in the output graph.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use rodio::Source;

use crate::error::AudioError;

use super::buffer::DecodedBuffer;
use super::context::{OutputDevice, SessionId};
use super::effects::{duration_to_frames, GainParam, GainState, PlaybackOptions};
use super::source::AssetName;

/// Flags shared by both halves of a session
struct SessionShared {
    /// Flips true -> false exactly once, on stop or natural end
    active: AtomicBool,

    /// Source must stop producing samples
    disconnected: AtomicBool,
}

/// Buffer source plus gain stage, as connected to the output
pub struct SessionSource {
    buffer: Arc<DecodedBuffer>,
    position: usize,
    looping: bool,
    gain: Arc<GainParam>,
    gain_version: u64,
    gain_state: GainState,
    frame_gain: f32,
    frame: u64,
    sample_in_frame: u16,
    shared: Arc<SessionShared>,
    completion: Option<Sender<()>>,
}

impl SessionSource {
    fn refresh_gain(&mut self) {
        if self.gain.version() != self.gain_version {
            let (version, state) = self.gain.snapshot();
            self.gain_version = version;
            self.gain_state = state;
        }
        if let Some(ramp) = self.gain_state.ramp {
            if ramp.is_complete(self.frame) {
                self.gain_state.ramp = None;
            }
        }
        self.frame_gain = self.gain_state.value_at(self.frame);
    }

    /// Buffer exhausted on a one-shot
    fn complete(&mut self) {
        if self.shared.active.swap(false, Ordering::AcqRel) {
            if let Some(completion) = self.completion.take() {
                let _ = completion.try_send(());
            }
        }
        self.completion = None;
    }
}

impl Iterator for SessionSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.shared.disconnected.load(Ordering::Acquire) {
            self.completion = None;
            return None;
        }

        if self.position >= self.buffer.samples().len() {
            if self.looping {
                self.position = 0;
            } else {
                self.complete();
                return None;
            }
        }

        if self.sample_in_frame == 0 {
            self.refresh_gain();
        }

        let sample = self.buffer.samples()[self.position] * self.frame_gain;
        self.position += 1;
        self.sample_in_frame += 1;
        if self.sample_in_frame == self.buffer.channels() {
            self.sample_in_frame = 0;
            self.frame += 1;
            self.gain.set_rendered_frames(self.frame);
        }

        Some(sample)
    }
}

impl Source for SessionSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.buffer.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.buffer.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        if self.looping {
            None
        } else {
            Some(self.buffer.duration())
        }
    }
}

/// Controller-side handle of one playing sound
pub struct PlaybackSession {
    id: SessionId,
    asset: AssetName,
    options: PlaybackOptions,
    sample_rate: u32,
    gain: Arc<GainParam>,
    shared: Arc<SessionShared>,
    completion: Receiver<()>,
}

impl PlaybackSession {
    /// Connect `buffer` through a fresh gain stage and start it at offset zero
    pub fn start(
        id: SessionId,
        device: &dyn OutputDevice,
        asset: AssetName,
        buffer: Arc<DecodedBuffer>,
        options: PlaybackOptions,
    ) -> Result<Self, AudioError> {
        let gain = Arc::new(GainParam::new(options.volume));
        let shared = Arc::new(SessionShared {
            active: AtomicBool::new(true),
            disconnected: AtomicBool::new(false),
        });
        let (completion_tx, completion_rx) = bounded(1);
        let sample_rate = buffer.sample_rate();

        let (gain_version, gain_state) = gain.snapshot();
        let source = SessionSource {
            buffer,
            position: 0,
            looping: options.looping,
            gain: Arc::clone(&gain),
            gain_version,
            gain_state,
            frame_gain: gain_state.value,
            frame: 0,
            sample_in_frame: 0,
            shared: Arc::clone(&shared),
            completion: Some(completion_tx),
        };

        device.play(source)?;

        tracing::debug!(
            "Started session {} for {} (loop={}, volume={})",
            id,
            asset,
            options.looping,
            options.volume
        );

        Ok(Self {
            id,
            asset,
            options,
            sample_rate,
            gain,
            shared,
            completion: completion_rx,
        })
    }

    /// Mute, then disconnect. Safe to call repeatedly and after the
    /// session ended on its own; returns whether this call stopped it.
    pub fn stop(&self) -> bool {
        if !self.shared.active.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.gain.mute();
        self.shared.disconnected.store(true, Ordering::Release);
        tracing::debug!("Stopped session {} for {}", self.id, self.asset);
        true
    }

    /// Ramp linearly to `fraction` of the base volume over `duration`.
    /// No-op (returns false) once the session is inactive.
    pub fn fade(&self, fraction: f32, duration: Duration) -> bool {
        if !self.is_active() {
            return false;
        }
        if !fraction.is_finite() {
            tracing::warn!("Ignoring fade on session {} to {}", self.id, fraction);
            return false;
        }
        let target = fraction.clamp(0.0, 1.0) * self.options.volume;
        let frames = duration_to_frames(duration, self.sample_rate);
        self.gain.ramp_to(target, frames);
        tracing::debug!(
            "Fading session {} to {:.3} over {:?}",
            self.id,
            target,
            duration
        );
        true
    }

    /// Whether the session left the graph, by natural end or because
    /// the output dropped its source.
    pub fn is_finished(&self) -> bool {
        match self.completion.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => !self.is_active(),
        }
    }

    /// Block until the session ends or `timeout` elapses
    pub fn wait_finished(&self, timeout: Duration) -> bool {
        match self.completion.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => !self.is_active(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current gain at the output
    pub fn current_volume(&self) -> f32 {
        self.gain.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::context::AudioContext;
    use crate::audio_system::offline::{OfflineBackend, OfflineDevice};

    fn buffer(frames: usize, sample_rate: u32) -> Arc<DecodedBuffer> {
        Arc::new(DecodedBuffer::from_samples(vec![1.0; frames], 1, sample_rate).unwrap())
    }

    fn start(
        device: &OfflineDevice,
        frames: usize,
        options: PlaybackOptions,
    ) -> PlaybackSession {
        let context = AudioContext::new(OfflineBackend::new());
        PlaybackSession::start(
            context.next_session_id(),
            device,
            AssetName::Click,
            buffer(frames, 1_000),
            options,
        )
        .unwrap()
    }

    #[test]
    fn test_one_shot_completes_once() {
        let device = OfflineDevice::new();
        let session = start(&device, 10, PlaybackOptions::one_shot(0.5));
        assert!(session.is_active());
        assert!(!session.is_finished());

        let out = device.render(20);
        assert!(out[..10].iter().all(|s| (*s - 0.5).abs() < 1e-6));
        assert!(out[10..].iter().all(|s| *s == 0.0));

        assert!(session.is_finished());
        assert!(!session.is_active());
        assert_eq!(device.connected_count(), 0);

        // Stop after natural end is a no-op
        assert!(!session.stop());
    }

    #[test]
    fn test_wait_finished() {
        let device = OfflineDevice::new();
        let session = start(&device, 5, PlaybackOptions::one_shot(1.0));
        assert!(!session.wait_finished(Duration::from_millis(5)));

        device.render(10);
        assert!(session.wait_finished(Duration::from_millis(5)));
    }

    #[test]
    fn test_loop_keeps_playing() {
        let device = OfflineDevice::new();
        let session = start(&device, 4, PlaybackOptions::looped(1.0));

        let out = device.render(100);
        assert!(out.iter().all(|s| *s == 1.0));
        assert!(!session.is_finished());
        assert_eq!(device.connected_count(), 1);
    }

    #[test]
    fn test_stop_mutes_then_disconnects() {
        let device = OfflineDevice::new();
        let session = start(&device, 4, PlaybackOptions::looped(0.8));
        device.render(8);

        assert!(session.stop());
        assert!(!session.stop());
        assert_eq!(session.current_volume(), 0.0);

        let out = device.render(8);
        assert!(out.iter().all(|s| *s == 0.0));
        assert_eq!(device.connected_count(), 0);
        assert!(session.is_finished());
    }

    #[test]
    fn test_fade_ramps_linearly() {
        let device = OfflineDevice::new();
        let session = start(&device, 100, PlaybackOptions::looped(0.8));
        device.render(10);

        // 0.8 -> 0.4 over 100 frames at 1 kHz
        assert!(session.fade(0.5, Duration::from_millis(100)));
        let out = device.render(100);
        assert!((out[0] - 0.8).abs() < 1e-6);
        assert!((out[50] - 0.6).abs() < 1e-3);
        assert!((out[99] - 0.404).abs() < 1e-3);

        let out = device.render(10);
        assert!(out.iter().all(|s| (*s - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_fade_on_stopped_session_is_noop() {
        let device = OfflineDevice::new();
        let session = start(&device, 10, PlaybackOptions::looped(0.5));
        session.stop();
        assert!(!session.fade(1.0, Duration::from_millis(100)));
        assert_eq!(session.current_volume(), 0.0);
    }

    #[test]
    fn test_non_finite_fade_is_rejected() {
        let device = OfflineDevice::new();
        let session = start(&device, 10, PlaybackOptions::looped(0.5));
        device.render(5);

        assert!(!session.fade(f32::NAN, Duration::ZERO));
        assert!(!session.fade(f32::INFINITY, Duration::from_millis(10)));
        assert_eq!(session.current_volume(), 0.5);
        assert!(device.render(20).iter().all(|s| *s == 0.5));
    }

    #[test]
    fn test_unbounded_fade_renders() {
        let device = OfflineDevice::new();
        let session = start(&device, 10, PlaybackOptions::looped(0.5));
        device.render(10);

        assert!(session.fade(0.5, Duration::from_millis(u64::MAX)));
        let out = device.render(100);
        assert!(out.iter().all(|s| (*s - 0.5).abs() < 1e-6));
        assert!((session.current_volume() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stop_during_fade_stays_silent() {
        let device = OfflineDevice::new();
        let session = start(&device, 10, PlaybackOptions::looped(0.5));
        device.render(5);
        session.fade(1.0, Duration::from_millis(1_000));
        device.render(5);
        session.stop();

        assert!(device.render(2_000).iter().all(|s| *s == 0.0));
        assert_eq!(session.current_volume(), 0.0);
    }

    #[test]
    fn test_start_failure_is_reported() {
        let device = OfflineDevice::new();
        device.set_fail_start(true);
        let context = AudioContext::new(OfflineBackend::new());
        let result = PlaybackSession::start(
            context.next_session_id(),
            &device,
            AssetName::Hover,
            buffer(10, 1_000),
            PlaybackOptions::one_shot(0.25),
        );
        assert!(matches!(result, Err(AudioError::StartFailed(_))));
        assert_eq!(device.connected_count(), 0);
    }

    #[test]
    fn test_stereo_gain_applies_per_frame() {
        let device = OfflineDevice::new();
        let stereo = Arc::new(DecodedBuffer::from_samples(vec![1.0; 8], 2, 1_000).unwrap());
        let context = AudioContext::new(OfflineBackend::new());
        let session = PlaybackSession::start(
            context.next_session_id(),
            &device,
            AssetName::Background,
            stereo,
            PlaybackOptions::one_shot(0.5),
        )
        .unwrap();

        let out = device.render(8);
        assert!(out.iter().all(|s| (*s - 0.5).abs() < 1e-6));
        device.render(1);
        assert!(session.is_finished());
    }
}
