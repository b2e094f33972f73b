/// Shared audio context
///
/// Owns the single output device every session is routed to. The device
/// is opened lazily on the first playback request and kept for the life
/// of the engine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use rodio::{OutputStream, OutputStreamHandle};

use crate::error::AudioError;

use super::session::SessionSource;

/// Lifecycle of the shared context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// No device opened yet
    Uninitialized,

    /// Device open, output not yet confirmed running
    Suspended,

    /// Device open and running
    Running,

    /// Torn down; no further playback
    Closed,
}

/// Opens output devices
pub trait AudioBackend: Send + Sync {
    fn open(&self) -> Result<Arc<dyn OutputDevice>, AudioError>;
}

/// A live output the processing graph renders into
pub trait OutputDevice: Send + Sync {
    /// Request the device transition to running
    fn resume(&self) -> Result<(), AudioError>;

    /// Connect a source to the output and start it immediately
    fn play(&self, source: SessionSource) -> Result<(), AudioError>;
}

/// Identifier of one playback session, unique per context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ContextInner {
    device: Option<Arc<dyn OutputDevice>>,
    state: ContextState,
}

/// The shared audio context
pub struct AudioContext {
    backend: Box<dyn AudioBackend>,
    inner: Mutex<ContextInner>,
    next_session: AtomicU64,
}

impl AudioContext {
    pub fn new(backend: impl AudioBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            inner: Mutex::new(ContextInner {
                device: None,
                state: ContextState::Uninitialized,
            }),
            next_session: AtomicU64::new(1),
        }
    }

    /// Return the output device, opening it on first use
    pub fn ensure(&self) -> Result<Arc<dyn OutputDevice>, AudioError> {
        let mut inner = self.inner.lock();
        match inner.state {
            ContextState::Closed => {
                return Err(AudioError::ContextUnavailable(
                    "audio context has been closed".to_string(),
                ))
            }
            ContextState::Suspended | ContextState::Running => {
                if let Some(device) = &inner.device {
                    return Ok(Arc::clone(device));
                }
            }
            ContextState::Uninitialized => {}
        }

        let device = self.backend.open()?;
        inner.device = Some(Arc::clone(&device));
        inner.state = ContextState::Suspended;
        tracing::info!("Audio context created");
        Ok(device)
    }

    /// Transition the context to running. Idempotent.
    ///
    /// A failure leaves the context suspended; callers log it and attempt
    /// playback anyway.
    pub fn resume(&self) -> Result<(), AudioError> {
        let device = self.ensure()?;
        if self.state() == ContextState::Running {
            return Ok(());
        }

        device.resume()?;

        let mut inner = self.inner.lock();
        if inner.state == ContextState::Suspended {
            inner.state = ContextState::Running;
            tracing::debug!("Audio context running");
        }
        Ok(())
    }

    pub fn state(&self) -> ContextState {
        self.inner.lock().state
    }

    /// Drop the device. Only used on teardown.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.state != ContextState::Closed {
            inner.device = None;
            inner.state = ContextState::Closed;
            tracing::info!("Audio context closed");
        }
    }

    /// Allocate an id for a new session
    pub fn next_session_id(&self) -> SessionId {
        SessionId(self.next_session.fetch_add(1, Ordering::Relaxed))
    }
}

/// Default output through rodio
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioBackend;

impl AudioBackend for RodioBackend {
    fn open(&self) -> Result<Arc<dyn OutputDevice>, AudioError> {
        Ok(Arc::new(RodioDevice::open()?))
    }
}

/// rodio output stream kept alive on its own thread
///
/// `OutputStream` is not `Send`, so it lives on an `audio-output` thread
/// that exits once the device (and with it `_shutdown`) is dropped.
struct RodioDevice {
    handle: OutputStreamHandle,
    _shutdown: Sender<()>,
}

impl RodioDevice {
    fn open() -> Result<Self, AudioError> {
        let (ready_tx, ready_rx) = bounded::<Result<OutputStreamHandle, String>>(1);
        let (shutdown_tx, shutdown_rx): (Sender<()>, Receiver<()>) = bounded(0);

        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    if ready_tx.send(Ok(handle)).is_err() {
                        return;
                    }
                    // Blocks until the device is dropped
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    tracing::debug!("Audio output stream released");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| AudioError::ContextUnavailable(e.to_string()))?;

        let handle = ready_rx
            .recv()
            .map_err(|e| AudioError::ContextUnavailable(e.to_string()))?
            .map_err(AudioError::ContextUnavailable)?;

        tracing::info!("Opened default audio output");
        Ok(Self {
            handle,
            _shutdown: shutdown_tx,
        })
    }
}

impl OutputDevice for RodioDevice {
    fn resume(&self) -> Result<(), AudioError> {
        // rodio streams run as soon as they are opened
        Ok(())
    }

    fn play(&self, source: SessionSource) -> Result<(), AudioError> {
        self.handle
            .play_raw(source)
            .map_err(|e| AudioError::StartFailed(Box::new(e)))
    }
}
