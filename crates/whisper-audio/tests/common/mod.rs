//! In-memory codec for exercising planners and transcoders without ffmpeg.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use whisper_audio::{AudioCodec, AudioError, EncodeOptions};

/// A codec call, as recorded by [`FakeCodec`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Probe(PathBuf),
    Transcode(PathBuf, EncodeOptions),
    Segment(f64, f64),
}

/// Fake backend whose output sizes follow simple formulas.
///
/// - transcodes with a bitrate write `bytes_per_kbps * bitrate` bytes
/// - transcodes without a bitrate write `plain_size` bytes
/// - segments write `bytes_per_sec * length + segment_overhead` bytes
pub struct FakeCodec {
    pub duration: f64,
    pub bytes_per_kbps: u64,
    pub plain_size: u64,
    pub bytes_per_sec: f64,
    pub segment_overhead: u64,
    calls: Mutex<Vec<Call>>,
}

impl FakeCodec {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            bytes_per_kbps: 1_000,
            plain_size: 4_096,
            bytes_per_sec: 1_000.0,
            segment_overhead: 0,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn segment_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Segment(..)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AudioCodec for FakeCodec {
    async fn probe_duration(&self, path: &Path) -> Result<f64, AudioError> {
        self.record(Call::Probe(path.to_path_buf()));
        Ok(self.duration)
    }

    async fn transcode(
        &self,
        _input: &Path,
        output: &Path,
        options: &EncodeOptions,
    ) -> Result<(), AudioError> {
        self.record(Call::Transcode(output.to_path_buf(), *options));
        let size = options
            .bitrate_kbps
            .map_or(self.plain_size, |kbps| self.bytes_per_kbps * u64::from(kbps));
        std::fs::write(output, vec![0u8; size as usize]).map_err(|e| AudioError::io(output, e))
    }

    async fn extract_segment(
        &self,
        _input: &Path,
        output: &Path,
        start_secs: f64,
        end_secs: f64,
    ) -> Result<(), AudioError> {
        self.record(Call::Segment(start_secs, end_secs));
        let size = ((end_secs - start_secs) * self.bytes_per_sec) as u64 + self.segment_overhead;
        std::fs::write(output, vec![0u8; size as usize]).map_err(|e| AudioError::io(output, e))
    }
}

/// Number of entries directly under `dir`.
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, Iterator::count)
}
