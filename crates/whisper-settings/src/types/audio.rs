//! File, chunking, compression, and codec settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where inputs may come from and where outputs go.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileSettings {
    /// When set, every input path must resolve inside this directory, and
    /// relative paths resolve against it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// Directory for generated outputs and scratch space. Falls back to the
    /// base directory, then the system temp directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl FileSettings {
    /// Directory generated files land in.
    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(|| self.base_dir.clone())
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// How large inputs are split before upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChunkingSettings {
    /// Largest file the transcription endpoint accepts, in bytes.
    pub size_ceiling_bytes: u64,
    /// Number of plans tried before giving up on an oversized segment.
    pub max_split_attempts: u32,
    /// Shortest chunk ever produced, in seconds.
    pub min_chunk_secs: f64,
    /// Interior chunk boundaries are rounded to this many milliseconds.
    pub boundary_granularity_ms: u64,
    /// Chunks uploaded concurrently per request.
    pub max_parallel_chunks: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            size_ceiling_bytes: 25 * whisper_core::BYTES_PER_MB,
            max_split_attempts: 3,
            min_chunk_secs: 1.0,
            boundary_granularity_ms: 10,
            max_parallel_chunks: 3,
        }
    }
}

/// One rung of the compression quality ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStep {
    /// Target mp3 bitrate in kbps.
    pub bitrate_kbps: u32,
    /// Output sample rate in Hz.
    pub sample_rate_hz: u32,
}

impl QualityStep {
    /// Construct a rung.
    pub const fn new(bitrate_kbps: u32, sample_rate_hz: u32) -> Self {
        Self {
            bitrate_kbps,
            sample_rate_hz,
        }
    }
}

/// Lossy compression settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressionSettings {
    /// Descending quality ladder, tried in order.
    pub ladder: Vec<QualityStep>,
    /// Default size budget for `compress_audio`, in megabytes.
    pub default_max_mb: f64,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            ladder: vec![
                QualityStep::new(128, 44_100),
                QualityStep::new(96, 44_100),
                QualityStep::new(64, 22_050),
                QualityStep::new(48, 22_050),
                QualityStep::new(32, 16_000),
                QualityStep::new(24, 16_000),
                QualityStep::new(16, 8_000),
            ],
            default_max_mb: 25.0,
        }
    }
}

/// External codec executables.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodecSettings {
    /// `ffmpeg` executable (name on `PATH` or absolute path).
    pub ffmpeg_path: String,
    /// `ffprobe` executable.
    pub ffprobe_path: String,
    /// Timeout for one codec subprocess, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            timeout_ms: 300_000,
        }
    }
}
