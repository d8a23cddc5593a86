//! `convert_audio` and `compress_audio`.

use serde_json::{Value, json};
use whisper_core::AudioFormat;

use super::{Services, resolve_output, round_mb};
use crate::errors::ToolError;

pub(super) async fn convert(
    services: &Services,
    input: &str,
    target: AudioFormat,
    output: Option<&str>,
) -> Result<Value, ToolError> {
    let source = services.inspector.inspect(input).await?;
    let output = resolve_output(services, output).await?;
    let converted = services.transcoder.convert(&source, target, output).await?;

    Ok(json!({
        "inputFilePath": source.path().display().to_string(),
        "outputFilePath": converted.path().display().to_string(),
        "format": converted.format().extension(),
        "converted": converted.path() != source.path(),
        "sizeBytes": converted.size_bytes(),
    }))
}

pub(super) async fn compress(
    services: &Services,
    input: &str,
    max_mb: f64,
    output: Option<&str>,
) -> Result<Value, ToolError> {
    let source = services.inspector.inspect(input).await?;
    let output = resolve_output(services, output).await?;
    let compression = services.transcoder.compress(&source, max_mb, output).await?;

    let mut payload = json!({
        "inputFilePath": source.path().display().to_string(),
        "outputFilePath": compression.file.path().display().to_string(),
        "compressed": compression.compressed,
        "originalSizeBytes": source.size_bytes(),
        "sizeBytes": compression.file.size_bytes(),
        "sizeMb": round_mb(compression.file.size_mb()),
    });
    match compression.step {
        Some(step) => {
            payload["bitrateKbps"] = json!(step.bitrate_kbps);
            payload["sampleRateHz"] = json!(step.sample_rate_hz);
        }
        None => {
            payload["message"] = json!(format!(
                "File is already under {max_mb} MB ({:.2} MB). No compression needed.",
                source.size_mb()
            ));
        }
    }
    Ok(payload)
}
