//! Fakes shared by the speech client tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use whisper_audio::{AudioCodec, AudioError, EncodeOptions};
use whisper_core::{AudioFile, ResponseFormat, TimedSegment};
use whisper_speech::{ChatRequest, RawTranscript, SpeechApi, SpeechError, SpeechRequest};

/// Codec whose segments are `bytes_per_sec * length` bytes long.
pub struct SegmentCodec {
    pub duration: f64,
    pub bytes_per_sec: f64,
}

#[async_trait]
impl AudioCodec for SegmentCodec {
    async fn probe_duration(&self, _path: &Path) -> Result<f64, AudioError> {
        Ok(self.duration)
    }

    async fn transcode(&self, _: &Path, output: &Path, _: &EncodeOptions) -> Result<(), AudioError> {
        std::fs::write(output, b"encoded").map_err(|e| AudioError::io(output, e))
    }

    async fn extract_segment(
        &self,
        _input: &Path,
        output: &Path,
        start_secs: f64,
        end_secs: f64,
    ) -> Result<(), AudioError> {
        let size = ((end_secs - start_secs) * self.bytes_per_sec) as usize;
        std::fs::write(output, vec![0u8; size]).map_err(|e| AudioError::io(output, e))
    }
}

/// Chunk index encoded in a planner scratch file name (`split0-chunk-003.mp3`).
pub fn chunk_index(file: &AudioFile) -> usize {
    let name = file.file_name();
    name.rsplit_once("chunk-")
        .and_then(|(_, rest)| rest.split('.').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// In-memory API: answers `part<N>` for chunk N after `delays[N]` ms.
#[derive(Default)]
pub struct ScriptedApi {
    pub delays_ms: Vec<u64>,
    pub fail_index: Option<usize>,
    pub seen: Mutex<Vec<usize>>,
}

#[async_trait]
impl SpeechApi for ScriptedApi {
    async fn transcribe(
        &self,
        file: &AudioFile,
        _prompt: Option<&str>,
        format: ResponseFormat,
    ) -> Result<RawTranscript, SpeechError> {
        let index = chunk_index(file);
        self.seen.lock().unwrap().push(index);
        let delay = self.delays_ms.get(index).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        if self.fail_index == Some(index) {
            return Err(SpeechError::Api {
                status: 400,
                message: format!("chunk {index} rejected"),
                code: None,
                retryable: false,
            });
        }

        let text = format!("part{index}");
        let segments = match format {
            ResponseFormat::Text => vec![],
            ResponseFormat::Segments => vec![TimedSegment {
                start: 0.5,
                end: 1.5,
                text: text.clone(),
            }],
        };
        Ok(RawTranscript { text, segments })
    }

    async fn chat(&self, _request: &ChatRequest) -> Result<Option<String>, SpeechError> {
        Ok(None)
    }

    async fn synthesize(&self, _request: &SpeechRequest) -> Result<Vec<u8>, SpeechError> {
        Ok(b"ID3".to_vec())
    }
}
