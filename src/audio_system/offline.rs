/// Headless output
///
/// Collects connected sources and mixes them only when asked to render.
/// Used where no audio hardware exists (CI, servers) and to drive the
/// engine deterministically.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::AudioError;

use super::context::{AudioBackend, OutputDevice};
use super::session::SessionSource;

#[derive(Default)]
struct DeviceInner {
    sources: Mutex<Vec<SessionSource>>,
    fail_resume: AtomicBool,
    fail_start: AtomicBool,
    resume_count: AtomicUsize,
    started: AtomicUsize,
}

/// Offline output device; clones share the same graph
#[derive(Clone, Default)]
pub struct OfflineDevice {
    inner: Arc<DeviceInner>,
}

impl OfflineDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `resume` fail, as a browser does without a user gesture
    pub fn set_fail_resume(&self, fail: bool) {
        self.inner.fail_resume.store(fail, Ordering::SeqCst);
    }

    /// Make `play` reject new sources
    pub fn set_fail_start(&self, fail: bool) {
        self.inner.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn resume_count(&self) -> usize {
        self.inner.resume_count.load(Ordering::SeqCst)
    }

    /// Total sources ever connected
    pub fn started_count(&self) -> usize {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Sources still connected to the output
    pub fn connected_count(&self) -> usize {
        self.inner.sources.lock().len()
    }

    /// Pull `samples` samples from every connected source and sum them.
    /// Sources that end are disconnected.
    pub fn render(&self, samples: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; samples];
        let mut sources = self.inner.sources.lock();
        sources.retain_mut(|source| {
            for slot in out.iter_mut() {
                match source.next() {
                    Some(sample) => *slot += sample,
                    None => return false,
                }
            }
            true
        });
        out
    }
}

impl OutputDevice for OfflineDevice {
    fn resume(&self) -> Result<(), AudioError> {
        self.inner.resume_count.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_resume.load(Ordering::SeqCst) {
            return Err(AudioError::start_failed("resume requires a user gesture"));
        }
        Ok(())
    }

    fn play(&self, source: SessionSource) -> Result<(), AudioError> {
        if self.inner.fail_start.load(Ordering::SeqCst) {
            return Err(AudioError::start_failed("playback rejected by output"));
        }
        self.inner.started.fetch_add(1, Ordering::SeqCst);
        self.inner.sources.lock().push(source);
        Ok(())
    }
}

/// Backend that always opens the same `OfflineDevice`
#[derive(Clone, Default)]
pub struct OfflineBackend {
    device: OfflineDevice,
    fail_open: Arc<AtomicBool>,
    opens: Arc<AtomicUsize>,
}

impl OfflineBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device handed out by `open`
    pub fn device(&self) -> &OfflineDevice {
        &self.device
    }

    /// Simulate a runtime without audio output
    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl AudioBackend for OfflineBackend {
    fn open(&self) -> Result<Arc<dyn OutputDevice>, AudioError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(AudioError::ContextUnavailable(
                "no audio output available".to_string(),
            ));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.device.clone()))
    }
}
