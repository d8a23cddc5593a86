//! Remote speech API settings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection and model settings for the OpenAI-compatible speech API.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSettings {
    /// API root, without a trailing slash (e.g. `https://api.openai.com/v1`).
    pub base_url: String,
    /// Bearer credential. Remote operations are refused while this is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model used by `/audio/transcriptions`.
    pub transcription_model: String,
    /// Audio-capable model used by `/chat/completions`.
    pub chat_model: String,
    /// Model used by `/audio/speech`.
    pub speech_model: String,
    /// Per-attempt timeout for a single remote call, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            transcription_model: "whisper-1".to_string(),
            chat_model: "gpt-4o-audio-preview-2024-12-17".to_string(),
            speech_model: "tts-1".to_string(),
            request_timeout_ms: 120_000,
        }
    }
}

impl ApiSettings {
    /// Whether a non-empty API key is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

// The key must never reach a log line.
impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("transcription_model", &self.transcription_model)
            .field("chat_model", &self.chat_model)
            .field("speech_model", &self.speech_model)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}
