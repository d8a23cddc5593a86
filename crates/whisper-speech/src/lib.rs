//! # whisper-speech
//!
//! Remote speech operations for the whisper tool server.
//!
//! - [`SpeechClient`]: transcription (with chunking and ordered reassembly),
//!   audio chat, and speech synthesis
//! - [`SpeechApi`]: one-round-trip seam over the remote endpoints, implemented
//!   by [`OpenAiSpeechApi`]
//! - [`RetryPolicy`]: per-attempt timeouts and exponential backoff for
//!   transient failures
//! - [`SpeechError`]: typed remote and local failures

#![deny(unsafe_code)]

pub mod api;
pub mod client;
pub mod error_parsing;
pub mod errors;
pub mod models;
pub mod openai;
pub mod retry;
pub mod voice;

pub use api::{ChatRequest, RawTranscript, SpeechApi, SpeechRequest};
pub use client::{EMPTY_CHAT_REPLY, SpeechClient, Transcription};
pub use errors::SpeechError;
pub use models::{CHAT_MODELS, SPEECH_MODELS, TRANSCRIPTION_MODELS};
pub use openai::OpenAiSpeechApi;
pub use retry::{Attempted, RetryPolicy};
pub use voice::Voice;
