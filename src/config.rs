use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio_system::AssetName;
use crate::error::ConfigError;

fn default_asset_dir() -> PathBuf {
    PathBuf::from("assets").join("sounds")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    /// File name relative to `asset_dir`
    pub file: String,

    /// Base volume (0.0-1.0)
    pub volume: f32,
}

impl SoundConfig {
    fn for_asset(asset: AssetName) -> Self {
        Self {
            file: asset.default_file().to_string(),
            volume: asset.default_volume(),
        }
    }
}

fn default_background() -> SoundConfig {
    SoundConfig::for_asset(AssetName::Background)
}

fn default_click() -> SoundConfig {
    SoundConfig::for_asset(AssetName::Click)
}

fn default_hover() -> SoundConfig {
    SoundConfig::for_asset(AssetName::Hover)
}

fn default_engine() -> SoundConfig {
    SoundConfig::for_asset(AssetName::Engine)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Directory holding the bundled sound files
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,

    /// Looping background track
    #[serde(default = "default_background")]
    pub background: SoundConfig,

    /// Click one-shot
    #[serde(default = "default_click")]
    pub click: SoundConfig,

    /// Hover one-shot
    #[serde(default = "default_hover")]
    pub hover: SoundConfig,

    /// Rocket engine drone
    #[serde(default = "default_engine")]
    pub engine: SoundConfig,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            asset_dir: default_asset_dir(),
            background: default_background(),
            click: default_click(),
            hover: default_hover(),
            engine: default_engine(),
        }
    }
}

impl AudioConfig {
    /// Load configuration from `path`.
    /// Creates a default config file if it doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = AudioConfig::default();
            config.save(path)?;
            tracing::info!("Created default audio config at: {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        let mut config: AudioConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        config.clamp_volumes();
        config.validate()?;

        tracing::info!("Loaded audio config from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            ConfigError::SaveFailed {
                path: path.display().to_string(),
                source,
            }
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| save_failed(Box::new(e)))?;
            }
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_failed(Box::new(e)))?;

        Ok(())
    }

    /// Reject entries that can never resolve to a file
    pub fn validate(&self) -> Result<(), ConfigError> {
        for asset in AssetName::ALL {
            if self.sound(asset).file.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "no file configured for {}",
                    asset
                )));
            }
        }
        Ok(())
    }

    /// Sound settings for an asset
    pub fn sound(&self, asset: AssetName) -> &SoundConfig {
        match asset {
            AssetName::Background => &self.background,
            AssetName::Click => &self.click,
            AssetName::Hover => &self.hover,
            AssetName::Engine => &self.engine,
        }
    }

    /// Full path of the file backing an asset
    pub fn asset_path(&self, asset: AssetName) -> PathBuf {
        self.asset_dir.join(&self.sound(asset).file)
    }

    fn clamp_volumes(&mut self) {
        for sound in [
            &mut self.background,
            &mut self.click,
            &mut self.hover,
            &mut self.engine,
        ] {
            sound.volume = sound.volume.clamp(0.0, 1.0);
        }
    }
}
