//! `create_speech`.

use serde_json::{Value, json};
use whisper_speech::Voice;

use super::{Services, resolve_output};
use crate::errors::ToolError;

pub(super) async fn create_speech(
    services: &Services,
    text: &str,
    voice: Voice,
    speed: f64,
    model: Option<&str>,
    output: Option<&str>,
) -> Result<Value, ToolError> {
    let output = resolve_output(services, output).await?;
    let file = services.speech.synthesize(text, voice, speed, model, output).await?;
    let mut payload = json!({
        "outputFilePath": file.path().display().to_string(),
        "voice": voice,
        "speed": speed,
        "sizeBytes": file.size_bytes(),
    });
    if let Some(model) = model {
        payload["model"] = json!(model);
    }
    Ok(payload)
}
