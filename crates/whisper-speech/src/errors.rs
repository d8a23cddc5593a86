//! Speech client error types.

use std::path::PathBuf;

use thiserror::Error;
use whisper_audio::AudioError;
use whisper_core::AudioFormat;

/// Errors from the remote speech API and the client around it.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credential rejected (401/403).
    #[error("auth error: {message}")]
    Auth {
        /// Error description.
        message: String,
    },

    /// Rate limited (429).
    #[error("rate limited: {message}")]
    RateLimited {
        /// Server-suggested delay, from `Retry-After`.
        retry_after_ms: Option<u64>,
        /// Error description.
        message: String,
    },

    /// Any other non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider error type, when present.
        code: Option<String>,
        /// Whether the status is transient (5xx).
        retryable: bool,
    },

    /// One attempt exceeded its time budget.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The per-attempt timeout.
        timeout_ms: u64,
    },

    /// The chat endpoint only takes mp3 and wav.
    #[error("{format} is not supported for audio chat; use mp3 or wav")]
    UnsupportedChatFormat {
        /// The rejected format.
        format: AudioFormat,
    },

    /// Reading the upload or writing the result failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Chunk preparation failed.
    #[error(transparent)]
    Audio(#[from] AudioError),
}

impl SpeechError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    })
            }
            Self::RateLimited { .. } | Self::Timeout { .. } => true,
            Self::Api { retryable, .. } => *retryable,
            Self::Json(_)
            | Self::Auth { .. }
            | Self::UnsupportedChatFormat { .. }
            | Self::Io { .. }
            | Self::Audio(_) => false,
        }
    }

    /// Server-suggested retry delay in milliseconds, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }

    /// Short category for log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Auth { .. } => "auth",
            Self::RateLimited { .. } => "rate_limit",
            Self::Api { .. } => "api",
            Self::Timeout { .. } => "timeout",
            Self::UnsupportedChatFormat { .. } => "format",
            Self::Io { .. } | Self::Audio(_) => "local",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(SpeechError::Timeout { timeout_ms: 10 }.is_retryable());
        assert!(
            SpeechError::RateLimited {
                retry_after_ms: Some(1000),
                message: "slow down".into(),
            }
            .is_retryable()
        );
        assert!(
            SpeechError::Api {
                status: 503,
                message: "overloaded".into(),
                code: None,
                retryable: true,
            }
            .is_retryable()
        );
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!SpeechError::Auth { message: "bad key".into() }.is_retryable());
        assert!(
            !SpeechError::Api {
                status: 400,
                message: "bad request".into(),
                code: None,
                retryable: false,
            }
            .is_retryable()
        );
        assert!(
            !SpeechError::UnsupportedChatFormat {
                format: AudioFormat::Flac
            }
            .is_retryable()
        );
    }

    #[test]
    fn retry_after_only_for_rate_limits() {
        let limited = SpeechError::RateLimited {
            retry_after_ms: Some(2000),
            message: String::new(),
        };
        assert_eq!(limited.retry_after_ms(), Some(2000));
        assert_eq!(SpeechError::Timeout { timeout_ms: 1 }.retry_after_ms(), None);
    }

    #[test]
    fn categories() {
        assert_eq!(SpeechError::Timeout { timeout_ms: 1 }.category(), "timeout");
        assert_eq!(SpeechError::Auth { message: String::new() }.category(), "auth");
    }
}
