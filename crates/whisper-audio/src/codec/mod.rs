//! The audio-processing backend seam.
//!
//! Components never shell out directly; they go through [`AudioCodec`], so
//! tests can substitute an in-memory fake. [`FfmpegCodec`] is the production
//! backend.

mod ffmpeg;
mod probe;

use std::path::Path;

use async_trait::async_trait;
use whisper_core::AudioFormat;

pub use ffmpeg::FfmpegCodec;
pub use probe::probe_duration_native;

use crate::errors::AudioError;

/// Encoder settings for one transcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Output container/codec.
    pub format: AudioFormat,
    /// Target bitrate in kbps (lossy formats only).
    pub bitrate_kbps: Option<u32>,
    /// Output sample rate in Hz.
    pub sample_rate_hz: Option<u32>,
}

impl EncodeOptions {
    /// Re-encode into `format` with the encoder's defaults.
    pub fn format(format: AudioFormat) -> Self {
        Self {
            format,
            bitrate_kbps: None,
            sample_rate_hz: None,
        }
    }

    /// mp3 at a fixed bitrate and sample rate.
    pub fn mp3(bitrate_kbps: u32, sample_rate_hz: u32) -> Self {
        Self {
            format: AudioFormat::Mp3,
            bitrate_kbps: Some(bitrate_kbps),
            sample_rate_hz: Some(sample_rate_hz),
        }
    }
}

/// Operations the audio-processing backend provides.
#[async_trait]
pub trait AudioCodec: Send + Sync {
    /// Duration of `path` in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64, AudioError>;

    /// Re-encode `input` into `output`.
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        options: &EncodeOptions,
    ) -> Result<(), AudioError>;

    /// Copy the `[start_secs, end_secs)` range of `input` into `output`,
    /// keeping the source encoding.
    async fn extract_segment(
        &self,
        input: &Path,
        output: &Path,
        start_secs: f64,
        end_secs: f64,
    ) -> Result<(), AudioError>;
}
