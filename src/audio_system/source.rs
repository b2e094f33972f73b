/// Audio asset identifiers
///
/// Logical names for the sounds the engine knows how to play. Each name
/// maps to exactly one cached buffer.
use std::fmt;

/// Audio asset categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetName {
    /// Looping background track
    Background,

    /// UI click one-shot
    Click,

    /// UI hover one-shot
    Hover,

    /// Rocket engine drone loop
    Engine,
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetName::Background => write!(f, "Background"),
            AssetName::Click => write!(f, "Click"),
            AssetName::Hover => write!(f, "Hover"),
            AssetName::Engine => write!(f, "Engine"),
        }
    }
}

impl AssetName {
    /// Every asset, in preload order
    pub const ALL: [AssetName; 4] = [
        AssetName::Background,
        AssetName::Click,
        AssetName::Hover,
        AssetName::Engine,
    ];

    /// Whether the asset's channel plays it as a loop
    pub fn is_looping(&self) -> bool {
        match self {
            AssetName::Background => true,
            AssetName::Click => false,
            AssetName::Hover => false,
            AssetName::Engine => true,
        }
    }

    /// Bundled file name
    pub fn default_file(&self) -> &'static str {
        match self {
            AssetName::Background => "background.mp3",
            AssetName::Click => "click.mp3",
            AssetName::Hover => "hover.mp3",
            AssetName::Engine => "rocket-engine.mp3",
        }
    }

    /// Base playback volume (0.0-1.0)
    pub fn default_volume(&self) -> f32 {
        match self {
            AssetName::Background => 0.3,
            AssetName::Click => 0.6,
            AssetName::Hover => 0.25,
            AssetName::Engine => 0.5,
        }
    }
}
