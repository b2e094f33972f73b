/// Decoded audio buffers and the buffer cache
///
/// Each asset is fetched and decoded at most once; the decoded PCM is
/// shared by every session that plays it.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rodio::{Decoder, Source};

use crate::error::AudioError;

use super::assets::AssetSource;
use super::context::AudioContext;
use super::source::AssetName;

/// Immutable decoded PCM for one asset
#[derive(Debug)]
pub struct DecodedBuffer {
    /// Interleaved samples
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedBuffer {
    /// Build a buffer from interleaved PCM
    pub fn from_samples(
        samples: Vec<f32>,
        channels: u16,
        sample_rate: u32,
    ) -> Result<Self, AudioError> {
        if channels == 0 || sample_rate == 0 {
            return Err(AudioError::InvalidFormat(format!(
                "{} channels at {} Hz",
                channels, sample_rate
            )));
        }
        if samples.is_empty() {
            return Err(AudioError::InvalidFormat("no audio frames".to_string()));
        }
        if samples.len() % channels as usize != 0 {
            return Err(AudioError::InvalidFormat(format!(
                "{} samples do not fill {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Decode an encoded file (mp3, wav, flac, vorbis)
    pub fn decode(bytes: &[u8]) -> Result<Self, AudioError> {
        // rodio's Decoder requires owned data with 'static lifetime
        let decoder = Decoder::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;

        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();

        Self::from_samples(samples, channels, sample_rate)
            .map_err(|e| AudioError::DecodeFailed(Box::new(e)))
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

type Slot = Arc<Mutex<Option<Arc<DecodedBuffer>>>>;

/// Memoizing decoder keyed by asset name
pub struct BufferCache {
    assets: Box<dyn AssetSource>,
    slots: Mutex<HashMap<AssetName, Slot>>,
    decodes: AtomicUsize,
}

impl BufferCache {
    pub fn new(assets: impl AssetSource + 'static) -> Self {
        Self {
            assets: Box::new(assets),
            slots: Mutex::new(HashMap::new()),
            decodes: AtomicUsize::new(0),
        }
    }

    /// Return the decoded buffer for `asset`, fetching and decoding it on
    /// first use.
    ///
    /// The slot lock is held across fetch and decode, so a concurrent
    /// caller for the same asset waits and then shares the result. A
    /// failure leaves the slot empty and the next call starts over.
    pub fn get_buffer(
        &self,
        context: &AudioContext,
        asset: AssetName,
    ) -> Result<Arc<DecodedBuffer>, AudioError> {
        let slot = Arc::clone(self.slots.lock().entry(asset).or_default());

        let mut cached = slot.lock();
        if let Some(buffer) = cached.as_ref() {
            return Ok(Arc::clone(buffer));
        }

        context.ensure()?;

        let buffer = self
            .assets
            .fetch(asset)
            .and_then(|bytes| DecodedBuffer::decode(&bytes))
            .map_err(|e| {
                tracing::warn!("Failed to prepare audio for {}: {}", asset, e);
                e
            })?;

        self.decodes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            "Decoded {}: {} frames, {} ch @ {} Hz",
            asset,
            buffer.frames(),
            buffer.channels(),
            buffer.sample_rate()
        );

        let buffer = Arc::new(buffer);
        *cached = Some(Arc::clone(&buffer));
        Ok(buffer)
    }

    /// Decode `assets` ahead of the first playback request
    pub fn preload(&self, context: &AudioContext, assets: &[AssetName]) -> usize {
        assets
            .iter()
            .filter(|asset| self.get_buffer(context, **asset).is_ok())
            .count()
    }

    pub fn is_cached(&self, asset: AssetName) -> bool {
        let Some(slot) = self.slots.lock().get(&asset).cloned() else {
            return false;
        };
        let cached = slot.lock().is_some();
        cached
    }

    /// Number of successful decodes so far
    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::assets::MemoryAssets;
    use crate::audio_system::offline::OfflineBackend;

    #[test]
    fn test_from_samples_validation() {
        assert!(DecodedBuffer::from_samples(vec![0.0; 4], 0, 44_100).is_err());
        assert!(DecodedBuffer::from_samples(vec![], 1, 44_100).is_err());
        assert!(DecodedBuffer::from_samples(vec![0.0; 3], 2, 44_100).is_err());

        let buffer = DecodedBuffer::from_samples(vec![0.0; 8], 2, 4).unwrap();
        assert_eq!(buffer.frames(), 4);
        assert_eq!(buffer.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let result = DecodedBuffer::decode(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(AudioError::DecodeFailed(_))));
    }

    #[test]
    fn test_failed_decode_is_not_cached() {
        let context = AudioContext::new(OfflineBackend::new());
        let cache = BufferCache::new(MemoryAssets::new().with(AssetName::Click, vec![0u8; 16]));

        assert!(cache.get_buffer(&context, AssetName::Click).is_err());
        assert!(!cache.is_cached(AssetName::Click));
        assert_eq!(cache.decode_count(), 0);
    }

    #[test]
    fn test_missing_asset_reports_error() {
        let context = AudioContext::new(OfflineBackend::new());
        let cache = BufferCache::new(MemoryAssets::new());
        assert!(matches!(
            cache.get_buffer(&context, AssetName::Hover),
            Err(AudioError::AssetLoadFailed { .. })
        ));
        assert_eq!(cache.preload(&context, &AssetName::ALL), 0);
    }

    #[test]
    fn test_unavailable_context_skips_fetch() {
        let backend = OfflineBackend::new();
        backend.set_fail_open(true);
        let context = AudioContext::new(backend);
        let cache = BufferCache::new(MemoryAssets::new());

        assert!(matches!(
            cache.get_buffer(&context, AssetName::Background),
            Err(AudioError::ContextUnavailable(_))
        ));
    }
}
