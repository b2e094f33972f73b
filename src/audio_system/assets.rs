/// Raw asset byte sources
///
/// The engine never decides how sounds are packaged; it asks an
/// `AssetSource` for the encoded bytes of a logical asset.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AudioConfig;
use crate::error::AudioError;

use super::source::AssetName;

/// Provider of encoded audio bytes
pub trait AssetSource: Send + Sync {
    /// Fetch the encoded bytes for `asset`
    fn fetch(&self, asset: AssetName) -> Result<Arc<Vec<u8>>, AudioError>;
}

/// Assets stored as files in a directory
pub struct DirAssets {
    paths: HashMap<AssetName, PathBuf>,
}

impl DirAssets {
    /// Resolve every asset through the config's directory and file names
    pub fn from_config(config: &AudioConfig) -> Self {
        let paths = AssetName::ALL
            .into_iter()
            .map(|asset| (asset, config.asset_path(asset)))
            .collect();
        Self { paths }
    }
}

impl AssetSource for DirAssets {
    fn fetch(&self, asset: AssetName) -> Result<Arc<Vec<u8>>, AudioError> {
        let path = self.paths.get(&asset).ok_or_else(|| AudioError::AssetLoadFailed {
            asset: asset.to_string(),
            source: "no path configured".into(),
        })?;

        let data = std::fs::read(path).map_err(|e| AudioError::AssetLoadFailed {
            asset: format!("{} ({})", asset, path.display()),
            source: Box::new(e),
        })?;

        tracing::info!(
            "Loaded audio for {}: {} ({} bytes)",
            asset,
            path.display(),
            data.len()
        );
        Ok(Arc::new(data))
    }
}

/// Assets held in memory, e.g. bundled with `include_bytes!`
#[derive(Default, Clone)]
pub struct MemoryAssets {
    data: HashMap<AssetName, Arc<Vec<u8>>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bytes for an asset
    pub fn with(mut self, asset: AssetName, bytes: impl Into<Vec<u8>>) -> Self {
        self.data.insert(asset, Arc::new(bytes.into()));
        self
    }
}

impl AssetSource for MemoryAssets {
    fn fetch(&self, asset: AssetName) -> Result<Arc<Vec<u8>>, AudioError> {
        self.data
            .get(&asset)
            .cloned()
            .ok_or_else(|| AudioError::AssetLoadFailed {
                asset: asset.to_string(),
                source: "asset not bundled".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_assets_fetch() {
        let assets = MemoryAssets::new().with(AssetName::Click, vec![1u8, 2, 3]);
        assert_eq!(*assets.fetch(AssetName::Click).unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            assets.fetch(AssetName::Hover),
            Err(AudioError::AssetLoadFailed { .. })
        ));
    }

    #[test]
    fn test_dir_assets_missing_file() {
        let mut config = AudioConfig::default();
        config.asset_dir = std::env::temp_dir().join("solar-audio-missing-assets");
        let assets = DirAssets::from_config(&config);
        assert!(assets.fetch(AssetName::Background).is_err());
    }

    #[test]
    fn test_dir_assets_reads_file() {
        let dir = std::env::temp_dir().join(format!("solar-audio-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("click.mp3"), [9u8, 9, 9]).unwrap();

        let mut config = AudioConfig::default();
        config.asset_dir = dir.clone();
        let assets = DirAssets::from_config(&config);
        assert_eq!(assets.fetch(AssetName::Click).unwrap().len(), 3);

        let _ = std::fs::remove_dir_all(dir);
    }
}
