//! Remote model catalogs.
//!
//! The configured defaults in `ApiSettings` need not appear here; these are
//! the names a caller may pick per request.

/// Models that accept every supported upload format.
pub const TRANSCRIPTION_MODELS: [&str; 3] = ["whisper-1", "gpt-4o-transcribe", "gpt-4o-mini-transcribe"];

/// Audio chat models; they only take mp3 and wav.
pub const CHAT_MODELS: [&str; 3] = [
    "gpt-4o-audio-preview-2024-10-01",
    "gpt-4o-audio-preview-2024-12-17",
    "gpt-4o-mini-audio-preview-2024-12-17",
];

/// Speech synthesis models.
pub const SPEECH_MODELS: [&str; 3] = ["tts-1", "tts-1-hd", "gpt-4o-mini-tts"];
