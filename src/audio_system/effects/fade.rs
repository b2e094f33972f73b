/// Gain parameter with linear fades
///
/// Shared between a session handle (control side) and its source (render
/// side). The control side writes values and ramps; the source reads them
/// only when the version changes and evaluates ramps per frame.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

/// Linear ramp between two gain values, positioned in source frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub from: f32,
    pub to: f32,
    pub start_frame: u64,
    pub frames: u64,
}

impl Ramp {
    /// Gain at `frame`
    pub fn value_at(&self, frame: u64) -> f32 {
        if self.frames == 0 || self.is_complete(frame) {
            return self.to;
        }
        if frame <= self.start_frame {
            return self.from;
        }
        let progress = (frame - self.start_frame) as f32 / self.frames as f32;
        self.from + (self.to - self.from) * progress
    }

    /// Whether the ramp has reached its target by `frame`
    pub fn is_complete(&self, frame: u64) -> bool {
        frame >= self.start_frame.saturating_add(self.frames)
    }
}

/// Snapshot of a gain parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainState {
    /// Resting value (the ramp target while a ramp is scheduled)
    pub value: f32,
    pub ramp: Option<Ramp>,
}

impl GainState {
    pub fn value_at(&self, frame: u64) -> f32 {
        match self.ramp {
            Some(ramp) => ramp.value_at(frame),
            None => self.value,
        }
    }
}

/// Gain node parameter
pub struct GainParam {
    state: Mutex<GainState>,
    version: AtomicU64,
    frames: AtomicU64,
}

impl GainParam {
    pub fn new(value: f32) -> Self {
        Self {
            state: Mutex::new(GainState {
                value: value.clamp(0.0, 1.0),
                ramp: None,
            }),
            version: AtomicU64::new(0),
            frames: AtomicU64::new(0),
        }
    }

    /// Gain at the most recently rendered frame
    pub fn current(&self) -> f32 {
        let frame = self.frames.load(Ordering::Acquire);
        self.state.lock().value_at(frame)
    }

    /// Set the value immediately, clearing any scheduled ramp
    pub fn set(&self, value: f32) {
        let mut state = self.state.lock();
        *state = GainState {
            value: value.clamp(0.0, 1.0),
            ramp: None,
        };
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Mute now. Cancels an in-flight ramp so it cannot revive the sound.
    pub fn mute(&self) {
        self.set(0.0);
    }

    /// Ramp linearly from the current value to `target` over `frames`
    pub fn ramp_to(&self, target: f32, frames: u64) {
        let target = target.clamp(0.0, 1.0);
        let now = self.frames.load(Ordering::Acquire);
        let mut state = self.state.lock();
        let from = state.value_at(now);
        *state = GainState {
            value: target,
            ramp: Some(Ramp {
                from,
                to: target,
                start_frame: now,
                frames,
            }),
        };
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Scheduled ramp, if any
    pub fn ramp(&self) -> Option<Ramp> {
        self.state.lock().ramp
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> (u64, GainState) {
        let state = self.state.lock();
        (self.version.load(Ordering::Acquire), *state)
    }

    /// Record how many frames the source has rendered
    pub fn set_rendered_frames(&self, frames: u64) {
        self.frames.store(frames, Ordering::Release);
    }

    pub fn rendered_frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }
}

/// Convert a fade duration to frames at `sample_rate`
pub fn duration_to_frames(duration: Duration, sample_rate: u32) -> u64 {
    (duration.as_secs_f64() * sample_rate as f64).round() as u64
}
