//! `get_file_support`.

use serde_json::{Value, json};
use whisper_speech::{CHAT_MODELS, TRANSCRIPTION_MODELS};

use super::{Services, round_mb};
use crate::errors::ToolError;

pub(super) async fn get_file_support(services: &Services, raw: &str) -> Result<Value, ToolError> {
    let description = services.inspector.describe(raw).await?;

    let transcription: &[&str] = if description.supported() {
        &TRANSCRIPTION_MODELS
    } else {
        &[]
    };
    let chat: &[&str] = if description.format.is_some_and(|f| f.supports_chat()) {
        &CHAT_MODELS
    } else {
        &[]
    };
    let size_mb = description.size_bytes as f64 / whisper_core::BYTES_PER_MB as f64;

    Ok(json!({
        "filePath": description.path.display().to_string(),
        "supported": description.supported(),
        "format": description.extension,
        "sizeBytes": description.size_bytes,
        "sizeMb": round_mb(size_mb),
        "durationSeconds": description.duration_secs,
        "transcriptionSupport": transcription,
        "chatSupport": chat,
        "modifiedTime": description.modified.map(|t| t.to_rfc3339()),
    }))
}
