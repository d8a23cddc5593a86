//! The remote speech API seam.
//!
//! [`SpeechApi`] is one round trip per method with no retries; retry and
//! timeout policy live in [`crate::retry::RetryPolicy`] and are applied by
//! [`crate::SpeechClient`]. Tests substitute in-memory implementations.

use async_trait::async_trait;
use whisper_core::{AudioFile, AudioFormat, ResponseFormat, TimedSegment};

use crate::errors::SpeechError;
use crate::voice::Voice;

/// Text (and optionally segments) recognized in one uploaded file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTranscript {
    /// Recognized text.
    pub text: String,
    /// Segments relative to the start of the uploaded file.
    pub segments: Vec<TimedSegment>,
}

/// An audio chat request.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    /// Base64-encoded audio.
    pub audio_base64: String,
    /// Format of the encoded audio (mp3 or wav).
    pub format: AudioFormat,
    /// Sent as a system message when present.
    pub system_prompt: Option<String>,
    /// Sent as a text part beside the audio when present.
    pub user_prompt: Option<String>,
    /// Chat model override; the backend's configured model otherwise.
    pub model: Option<String>,
}

/// A speech synthesis request.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechRequest {
    /// Text to speak.
    pub input: String,
    /// Voice to speak with.
    pub voice: Voice,
    /// Playback speed, 0.25 to 4.0.
    pub speed: f64,
    /// Synthesis model override; the backend's configured model otherwise.
    pub model: Option<String>,
}

/// One call per remote endpoint.
#[async_trait]
pub trait SpeechApi: Send + Sync {
    /// Transcribe a single file that is already under the upload ceiling.
    async fn transcribe(
        &self,
        file: &AudioFile,
        prompt: Option<&str>,
        format: ResponseFormat,
    ) -> Result<RawTranscript, SpeechError>;

    /// Ask the audio chat model about a clip. `None` when the reply has no text.
    async fn chat(&self, request: &ChatRequest) -> Result<Option<String>, SpeechError>;

    /// Synthesize speech, returning mp3 bytes.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, SpeechError>;
}
