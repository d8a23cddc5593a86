//! High-level speech operations over the [`SpeechApi`] seam.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{info, instrument};
use whisper_audio::{AudioCodec, AudioError, ChunkPlanner, ScratchDir};
use whisper_core::{AudioFile, AudioFormat, ChunkTranscript, TranscriptResult, TranscriptionRequest};
use whisper_settings::WhisperSettings;

use crate::api::{ChatRequest, SpeechApi, SpeechRequest};
use crate::errors::SpeechError;
use crate::openai::OpenAiSpeechApi;
use crate::retry::{Attempted, RetryPolicy};
use crate::voice::Voice;

/// Reply used when the chat model returns no text.
pub const EMPTY_CHAT_REPLY: &str = "No response generated";

/// A completed transcription.
#[derive(Clone, Debug, PartialEq)]
pub struct Transcription {
    /// The assembled transcript.
    pub result: TranscriptResult,
    /// Remote attempts made across all chunks.
    pub attempts: u32,
}

/// Transcription, audio chat and synthesis with chunking and retries.
#[derive(Clone)]
pub struct SpeechClient {
    api: Arc<dyn SpeechApi>,
    planner: ChunkPlanner,
    policy: RetryPolicy,
    max_parallel: usize,
    output_dir: PathBuf,
}

impl SpeechClient {
    /// Create a client. Scratch files and default outputs go under `output_dir`.
    pub fn new(
        api: Arc<dyn SpeechApi>,
        planner: ChunkPlanner,
        policy: RetryPolicy,
        max_parallel: usize,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            api,
            planner,
            policy,
            max_parallel: max_parallel.max(1),
            output_dir,
        }
    }

    /// Build a client backed by the OpenAI HTTP API.
    pub fn from_settings(settings: &WhisperSettings, codec: Arc<dyn AudioCodec>) -> Result<Self, SpeechError> {
        let api = OpenAiSpeechApi::new(&settings.api)?;
        Ok(Self::new(
            Arc::new(api),
            ChunkPlanner::new(settings.chunking.clone(), codec),
            RetryPolicy::new(
                settings.retry.clone(),
                Duration::from_millis(settings.api.request_timeout_ms),
            ),
            settings.chunking.max_parallel_chunks,
            settings.files.effective_output_dir(),
        ))
    }

    /// Directory for default outputs and scratch space.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Default synthesis output: `speech-<uuid>.mp3` in the output directory.
    pub fn default_speech_output(&self) -> PathBuf {
        self.output_dir.join(format!("speech-{}.mp3", uuid::Uuid::now_v7()))
    }

    /// Transcribe a request, splitting the source when it exceeds the ceiling.
    ///
    /// Chunks are uploaded concurrently and reassembled by index. The first
    /// chunk to exhaust its retries fails the whole request.
    #[instrument(skip_all, fields(file = %request.source().file_name(), enhancement = %request.enhancement()))]
    pub async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcription, SpeechError> {
        let scratch = ScratchDir::new_in(&self.output_dir).await?;
        let mut source = request.source().clone();
        let prepared = self
            .planner
            .split(&mut source, self.planner.size_ceiling_bytes(), &scratch)
            .await?;

        let api = self.api.as_ref();
        let policy = &self.policy;
        let prompt = request.effective_prompt();
        let format = request.response_format();

        let uploads: Vec<_> = prepared
            .iter()
            .map(move |prepared| async move {
                let reply = policy
                    .run("transcribe", move || api.transcribe(&prepared.file, prompt, format))
                    .await?;
                let chunk = ChunkTranscript {
                    index: prepared.chunk.index,
                    start_secs: prepared.chunk.start_secs,
                    text: reply.value.text,
                    segments: reply.value.segments,
                };
                Ok::<_, SpeechError>((chunk, reply.attempts))
            })
            .collect();
        let transcribed: Vec<(ChunkTranscript, u32)> = stream::iter(uploads)
            .buffer_unordered(self.max_parallel)
            .try_collect()
            .await?;

        let attempts = transcribed.iter().map(|(_, a)| a).sum::<u32>();
        let result = TranscriptResult::assemble(transcribed.into_iter().map(|(c, _)| c).collect());
        info!(
            chunks = result.chunks().len(),
            attempts,
            chars = result.text().len(),
            "transcription complete"
        );
        Ok(Transcription { result, attempts })
    }

    /// Ask the audio chat model about `file` (mp3 or wav only). `model`
    /// overrides the configured chat model.
    #[instrument(skip_all, fields(file = %file.file_name()))]
    pub async fn chat(
        &self,
        file: &AudioFile,
        system_prompt: Option<&str>,
        user_prompt: Option<&str>,
        model: Option<&str>,
    ) -> Result<Attempted<String>, SpeechError> {
        if !file.format().supports_chat() {
            return Err(SpeechError::UnsupportedChatFormat {
                format: file.format(),
            });
        }

        let bytes = tokio::fs::read(file.path())
            .await
            .map_err(|source| SpeechError::Io {
                path: file.path().to_path_buf(),
                source,
            })?;
        let request = ChatRequest {
            audio_base64: STANDARD.encode(bytes),
            format: file.format(),
            system_prompt: system_prompt.map(String::from),
            user_prompt: user_prompt.map(String::from),
            model: model.map(String::from),
        };

        let api = self.api.as_ref();
        let reply = self.policy.run("chat", || api.chat(&request)).await?;
        let text = reply
            .value
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| EMPTY_CHAT_REPLY.to_string());
        info!(attempts = reply.attempts, chars = text.len(), "chat reply received");
        Ok(Attempted {
            value: text,
            attempts: reply.attempts,
        })
    }

    /// Synthesize `text` and write the mp3 to `output` (or the default path).
    #[instrument(skip_all, fields(voice = %voice, speed = speed))]
    pub async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        speed: f64,
        model: Option<&str>,
        output: Option<PathBuf>,
    ) -> Result<AudioFile, SpeechError> {
        let output = output.unwrap_or_else(|| self.default_speech_output());
        let request = SpeechRequest {
            input: text.to_string(),
            voice,
            speed,
            model: model.map(String::from),
        };

        let api = self.api.as_ref();
        let audio = self.policy.run("speech", || api.synthesize(&request)).await?;
        let size = write_whole(&output, &audio.value).await?;
        info!(output = %output.display(), size_bytes = size, "speech written");
        Ok(AudioFile::new(output, size).map_err(AudioError::from)?)
    }
}

/// Write `bytes` beside `path` and rename into place, so readers never see a
/// partial file.
async fn write_whole(path: &Path, bytes: &[u8]) -> Result<u64, SpeechError> {
    let io_err = |source: std::io::Error| SpeechError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let partial = path.with_extension(format!("{}.partial", AudioFormat::Mp3));
    if let Err(source) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(io_err(source));
    }
    if let Err(source) = tokio::fs::rename(&partial, path).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(io_err(source));
    }
    Ok(bytes.len() as u64)
}
