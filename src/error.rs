use thiserror::Error;

/// Audio engine errors using thiserror for structured error handling.
///
/// None of these are fatal to the surrounding application: channel
/// controllers catch them at their origin, log them, and fall back to a
/// silent no-op. They can be chained with anyhow in the demo binary.

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio output is unavailable: {0}")]
    ContextUnavailable(String),

    #[error("Failed to load audio asset: {asset}")]
    AssetLoadFailed {
        asset: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to decode audio format")]
    DecodeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Audio playback failed to start")]
    StartFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),
}

impl AudioError {
    /// Wrap a plain message as a start failure
    pub fn start_failed(message: impl Into<String>) -> Self {
        let message: String = message.into();
        AudioError::StartFailed(message.into())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
