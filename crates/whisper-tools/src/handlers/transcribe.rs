//! `transcribe_audio`, `transcribe_with_enhancement` and `chat_with_audio`.

use serde_json::{Value, json};
use whisper_core::{EnhancementProfile, ResponseFormat, TranscriptionRequest};

use super::Services;
use crate::errors::ToolError;

pub(super) async fn transcribe(
    services: &Services,
    input: &str,
    response_format: ResponseFormat,
    prompt: Option<String>,
) -> Result<Value, ToolError> {
    let source = services.inspector.inspect(input).await?;
    let request = TranscriptionRequest::new(source, response_format, prompt);
    run(services, &request).await
}

pub(super) async fn transcribe_enhanced(
    services: &Services,
    input: &str,
    enhancement: EnhancementProfile,
    response_format: ResponseFormat,
) -> Result<Value, ToolError> {
    let source = services.inspector.inspect(input).await?;
    let request = TranscriptionRequest::enhanced(source, response_format, enhancement);
    let mut payload = run(services, &request).await?;
    payload["enhancementType"] = json!(enhancement.as_str());
    Ok(payload)
}

async fn run(services: &Services, request: &TranscriptionRequest) -> Result<Value, ToolError> {
    let transcription = services.speech.transcribe(request).await?;
    let result = &transcription.result;

    let mut payload = json!({
        "inputFilePath": request.source().path().display().to_string(),
        "text": result.text(),
        "responseFormat": match request.response_format() {
            ResponseFormat::Text => "text",
            ResponseFormat::Segments => "segments",
        },
        "chunkCount": result.chunks().len(),
        "attempts": transcription.attempts,
    });
    if request.response_format() == ResponseFormat::Segments {
        payload["segments"] = json!(result.segments());
    }
    Ok(payload)
}

pub(super) async fn chat(
    services: &Services,
    input: &str,
    system_prompt: Option<&str>,
    user_prompt: Option<&str>,
    model: Option<&str>,
) -> Result<Value, ToolError> {
    let source = services.inspector.inspect(input).await?;
    let reply = services.speech.chat(&source, system_prompt, user_prompt, model).await?;
    let mut payload = json!({
        "inputFilePath": source.path().display().to_string(),
        "text": reply.value,
        "attempts": reply.attempts,
    });
    if let Some(model) = model {
        payload["model"] = json!(model);
    }
    Ok(payload)
}
