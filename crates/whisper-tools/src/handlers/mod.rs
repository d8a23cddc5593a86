//! Operation handlers.
//!
//! Handlers receive parameters that have already been validated and return
//! the JSON payload for a completed envelope. Component errors are converted
//! to [`ToolError`] on the way out.

mod audio;
mod speech;
mod support;
mod transcribe;

use serde_json::Value;
use whisper_audio::{AudioTranscoder, FileInspector};
use whisper_speech::SpeechClient;

use crate::errors::ToolError;
use crate::operation::OperationParams;

/// Components shared by every handler.
#[derive(Clone)]
pub struct Services {
    /// Input and output path handling.
    pub inspector: FileInspector,
    /// Conversion and compression.
    pub transcoder: AudioTranscoder,
    /// Remote speech operations.
    pub speech: SpeechClient,
}

/// Run the handler for `params`.
pub async fn execute(services: &Services, params: OperationParams) -> Result<Value, ToolError> {
    match params {
        OperationParams::Transcribe {
            input_file_path,
            response_format,
            prompt,
        } => transcribe::transcribe(services, &input_file_path, response_format, prompt).await,
        OperationParams::TranscribeEnhanced {
            input_file_path,
            enhancement,
            response_format,
        } => transcribe::transcribe_enhanced(services, &input_file_path, enhancement, response_format).await,
        OperationParams::ChatWithAudio {
            input_file_path,
            system_prompt,
            user_prompt,
            model,
        } => {
            transcribe::chat(
                services,
                &input_file_path,
                system_prompt.as_deref(),
                user_prompt.as_deref(),
                model.as_deref(),
            )
            .await
        }
        OperationParams::Convert {
            input_file_path,
            target_format,
            output_file_path,
        } => audio::convert(services, &input_file_path, target_format, output_file_path.as_deref()).await,
        OperationParams::Compress {
            input_file_path,
            max_mb,
            output_file_path,
        } => audio::compress(services, &input_file_path, max_mb, output_file_path.as_deref()).await,
        OperationParams::CreateSpeech {
            text_prompt,
            voice,
            speed,
            model,
            output_file_path,
        } => {
            speech::create_speech(
                services,
                &text_prompt,
                voice,
                speed,
                model.as_deref(),
                output_file_path.as_deref(),
            )
            .await
        }
        OperationParams::GetFileSupport { file_path } => support::get_file_support(services, &file_path).await,
    }
}

/// Resolve an optional caller-supplied output path.
async fn resolve_output(services: &Services, raw: Option<&str>) -> Result<Option<std::path::PathBuf>, ToolError> {
    match raw {
        Some(raw) => Ok(Some(services.inspector.resolve_output(raw).await?)),
        None => Ok(None),
    }
}

/// Megabytes rounded to two decimals for display.
fn round_mb(mb: f64) -> f64 {
    (mb * 100.0).round() / 100.0
}
