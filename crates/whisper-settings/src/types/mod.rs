//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]`. Each section implements
//! [`Default`] and is `#[serde(default)]`, so partial JSON fills the gaps.

mod api;
mod audio;

pub use api::*;
pub use audio::*;

use serde::{Deserialize, Serialize};
use whisper_core::RetryConfig;

use crate::errors::{Result, SettingsError};

/// Root settings for the whisper tool server.
///
/// Loaded once at startup and passed by reference into every component.
///
/// ```json
/// {
///   "api": { "transcriptionModel": "whisper-1" },
///   "chunking": { "maxParallelChunks": 4 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhisperSettings {
    /// Remote speech API.
    pub api: ApiSettings,
    /// Input and output locations.
    pub files: FileSettings,
    /// Large-file splitting.
    pub chunking: ChunkingSettings,
    /// Compression quality ladder.
    pub compression: CompressionSettings,
    /// Retry policy for remote calls.
    pub retry: RetryConfig,
    /// Codec subprocesses.
    pub codec: CodecSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

impl WhisperSettings {
    /// Reject combinations no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.size_ceiling_bytes == 0 {
            return Err(SettingsError::InvalidValue(
                "chunking.sizeCeilingBytes must be positive".into(),
            ));
        }
        if self.chunking.max_parallel_chunks == 0 {
            return Err(SettingsError::InvalidValue(
                "chunking.maxParallelChunks must be positive".into(),
            ));
        }
        if self.chunking.max_split_attempts == 0 {
            return Err(SettingsError::InvalidValue(
                "chunking.maxSplitAttempts must be positive".into(),
            ));
        }
        if self.chunking.min_chunk_secs.is_nan() || self.chunking.min_chunk_secs <= 0.0 {
            return Err(SettingsError::InvalidValue(
                "chunking.minChunkSecs must be positive".into(),
            ));
        }
        if self.compression.ladder.is_empty() {
            return Err(SettingsError::InvalidValue(
                "compression.ladder must not be empty".into(),
            ));
        }
        if self.api.request_timeout_ms == 0 || self.codec.timeout_ms == 0 {
            return Err(SettingsError::InvalidValue("timeouts must be positive".into()));
        }
        Ok(())
    }

    /// The configured API key, or [`SettingsError::MissingApiKey`].
    pub fn require_api_key(&self) -> Result<&str> {
        if self.api.has_credential() {
            Ok(self.api.api_key.as_deref().unwrap_or_default())
        } else {
            Err(SettingsError::MissingApiKey)
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
