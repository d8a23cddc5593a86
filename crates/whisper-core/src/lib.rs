//! # whisper-core
//!
//! Shared vocabulary for the whisper tool server.
//!
//! - **Audio model**: [`AudioFormat`] (the closed set of accepted extensions)
//!   and [`AudioFile`] (a validated, inspected input file)
//! - **Requests**: [`TranscriptionRequest`] with response format and
//!   enhancement profile
//! - **Transcripts**: [`TranscriptResult`] assembled from per-chunk results
//! - **Retry**: backoff math and `Retry-After` parsing
//! - **Tools**: JSON Schema definitions sent to tool hosts
//! - **Logging**: `tracing` subscriber setup and in-memory capture for tests

#![deny(unsafe_code)]

pub mod audio;
pub mod logging;
pub mod request;
pub mod retry;
pub mod tools;
pub mod transcript;

pub use audio::{AudioFile, AudioFormat, FormatError};
pub use request::{EnhancementProfile, ResponseFormat, TranscriptionRequest};
pub use retry::RetryConfig;
pub use tools::{Tool, ToolParameterSchema};
pub use transcript::{ChunkTranscript, TimedSegment, TranscriptResult};

/// Bytes per megabyte, as used for every size budget in the tool surface.
pub const BYTES_PER_MB: u64 = 1024 * 1024;
