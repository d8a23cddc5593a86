//! Tool error types.
//!
//! [`ToolError`] is the only error that leaves the router. Component errors
//! are translated here, each into one [`ErrorKind`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use whisper_audio::AudioError;
use whisper_core::FormatError;
use whisper_settings::SettingsError;
use whisper_speech::SpeechError;

/// Error class reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Bad or missing parameters, caught before any work.
    Validation,
    /// Extension outside the supported set.
    UnsupportedFormat,
    /// Local filesystem or codec failure.
    IoFailure,
    /// The remote API failed after retries, or a size budget could not be met.
    UpstreamFailure,
    /// Missing credential or unusable settings.
    Configuration,
}

impl ErrorKind {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::UnsupportedFormat => "unsupported-format",
            Self::IoFailure => "io-failure",
            Self::UpstreamFailure => "upstream-failure",
            Self::Configuration => "configuration",
        }
    }
}

/// Errors returned by tool invocations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Parameter validation failed.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Unsupported audio format.
    #[error("{message}")]
    UnsupportedFormat {
        /// Description naming the format.
        message: String,
    },

    /// Local I/O or codec failure.
    #[error("{message}")]
    Io {
        /// Description of the failure.
        message: String,
    },

    /// Remote API failure.
    #[error("{message}")]
    Upstream {
        /// Description of the failure.
        message: String,
        /// Server-suggested delay before trying again.
        retry_after_ms: Option<u64>,
    },

    /// Configuration problem.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },
}

impl ToolError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// The caller-facing error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::Upstream { .. } => ErrorKind::UpstreamFailure,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Retry hint, for rate-limited upstream failures.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::Upstream { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }
}

impl From<FormatError> for ToolError {
    fn from(err: FormatError) -> Self {
        Self::UnsupportedFormat {
            message: err.to_string(),
        }
    }
}

impl From<AudioError> for ToolError {
    fn from(err: AudioError) -> Self {
        let message = err.to_string();
        match err {
            AudioError::UnsupportedFormat(e) => e.into(),
            AudioError::OutsideBaseDir { .. }
            | AudioError::InvalidOutput { .. }
            | AudioError::InvalidTarget { .. } => Self::Validation { message },
            AudioError::Io { .. }
            | AudioError::IsDirectory { .. }
            | AudioError::DurationUnknown { .. }
            | AudioError::Codec { .. }
            | AudioError::Timeout { .. } => Self::Io { message },
            AudioError::ChunkTooLarge { .. } | AudioError::QualityFloor { .. } => Self::Upstream {
                message,
                retry_after_ms: None,
            },
        }
    }
}

impl From<SpeechError> for ToolError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Audio(e) => e.into(),
            SpeechError::UnsupportedChatFormat { .. } => Self::UnsupportedFormat {
                message: err.to_string(),
            },
            SpeechError::Io { .. } => Self::Io {
                message: err.to_string(),
            },
            SpeechError::Http(_)
            | SpeechError::Json(_)
            | SpeechError::Auth { .. }
            | SpeechError::RateLimited { .. }
            | SpeechError::Api { .. }
            | SpeechError::Timeout { .. } => Self::Upstream {
                retry_after_ms: err.retry_after_ms(),
                message: format!("speech API error: {err}"),
            },
        }
    }
}

impl From<SettingsError> for ToolError {
    fn from(err: SettingsError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}
