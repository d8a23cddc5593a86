//! OpenAI-compatible HTTP backend for [`SpeechApi`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, multipart};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use whisper_core::{AudioFile, ResponseFormat, TimedSegment};
use whisper_settings::ApiSettings;

use crate::api::{ChatRequest, RawTranscript, SpeechApi, SpeechRequest};
use crate::error_parsing::error_from_response;
use crate::errors::SpeechError;

/// Talks to `/audio/transcriptions`, `/chat/completions` and `/audio/speech`.
///
/// Holds no timeout of its own; each call is bounded by the retry policy.
#[derive(Clone)]
pub struct OpenAiSpeechApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    transcription_model: String,
    chat_model: String,
    speech_model: String,
}

impl OpenAiSpeechApi {
    /// Build a backend from API settings.
    pub fn new(settings: &ApiSettings) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("whisper-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            transcription_model: settings.transcription_model.clone(),
            chat_model: settings.chat_model.clone(),
            speech_model: settings.speech_model.clone(),
        })
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        let request = self.client.post(format!("{}{endpoint}", self.base_url));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

/// Pass through success responses, map everything else to a typed error.
async fn check_status(response: Response) -> Result<Response, SpeechError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    Err(error_from_response(status, &headers, &body))
}

#[derive(Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<TimedSegment>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Build the `/chat/completions` body for an audio question.
fn chat_body(model: &str, request: &ChatRequest) -> Value {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system_prompt {
        messages.push(json!({ "role": "system", "content": system }));
    }

    let mut content = vec![json!({
        "type": "input_audio",
        "input_audio": {
            "data": request.audio_base64,
            "format": request.format.extension(),
        },
    })];
    if let Some(user) = &request.user_prompt {
        content.push(json!({ "type": "text", "text": user }));
    }
    messages.push(json!({ "role": "user", "content": content }));

    json!({
        "model": model,
        "modalities": ["text"],
        "messages": messages,
    })
}

#[async_trait]
impl SpeechApi for OpenAiSpeechApi {
    #[instrument(skip_all, fields(file = %file.file_name(), model = %self.transcription_model))]
    async fn transcribe(
        &self,
        file: &AudioFile,
        prompt: Option<&str>,
        format: ResponseFormat,
    ) -> Result<RawTranscript, SpeechError> {
        let bytes = tokio::fs::read(file.path())
            .await
            .map_err(|source| SpeechError::Io {
                path: file.path().to_path_buf(),
                source,
            })?;
        let size = bytes.len();

        let part = multipart::Part::bytes(bytes)
            .file_name(file.file_name())
            .mime_str(file.format().mime_type())?;
        let mut form = multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .text("response_format", format.api_value())
            .part("file", part);
        if let Some(prompt) = prompt {
            form = form.text("prompt", prompt.to_string());
        }
        if format == ResponseFormat::Segments {
            form = form.text("timestamp_granularities[]", "segment");
        }

        debug!(size_bytes = size, response_format = format.api_value(), "uploading audio");
        let response = check_status(self.post("/audio/transcriptions").multipart(form).send().await?).await?;

        match format {
            ResponseFormat::Text => Ok(RawTranscript {
                text: response.text().await?.trim().to_string(),
                segments: Vec::new(),
            }),
            ResponseFormat::Segments => {
                let body = response.text().await?;
                let parsed: VerboseTranscription = serde_json::from_str(&body)?;
                Ok(RawTranscript {
                    text: parsed.text.trim().to_string(),
                    segments: parsed.segments,
                })
            }
        }
    }

    #[instrument(skip_all, fields(model = %request.model.as_deref().unwrap_or(&self.chat_model), format = %request.format))]
    async fn chat(&self, request: &ChatRequest) -> Result<Option<String>, SpeechError> {
        let model = request.model.as_deref().unwrap_or(&self.chat_model);
        let response = check_status(
            self.post("/chat/completions")
                .json(&chat_body(model, request))
                .send()
                .await?,
        )
        .await?;
        let body = response.text().await?;
        let completion: ChatCompletion = serde_json::from_str(&body)?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content))
    }

    #[instrument(skip_all, fields(model = %request.model.as_deref().unwrap_or(&self.speech_model), voice = %request.voice))]
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, SpeechError> {
        let body = json!({
            "model": request.model.as_deref().unwrap_or(&self.speech_model),
            "input": request.input,
            "voice": request.voice.as_str(),
            "speed": request.speed,
            "response_format": "mp3",
        });
        let response = check_status(self.post("/audio/speech").json(&body).send().await?).await?;
        let bytes = response.bytes().await?;
        debug!(size_bytes = bytes.len(), "received synthesized audio");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whisper_core::AudioFormat;

    fn request(system: Option<&str>, user: Option<&str>) -> ChatRequest {
        ChatRequest {
            audio_base64: "AAAA".into(),
            format: AudioFormat::Wav,
            system_prompt: system.map(String::from),
            user_prompt: user.map(String::from),
            model: None,
        }
    }

    #[test]
    fn chat_body_with_both_prompts() {
        let body = chat_body("gpt-4o-audio-preview", &request(Some("be brief"), Some("what is said?")));
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "be brief");
        let content = messages[1]["content"].as_array().unwrap();
        assert_eq!(content[0]["type"], "input_audio");
        assert_eq!(content[0]["input_audio"]["data"], "AAAA");
        assert_eq!(content[0]["input_audio"]["format"], "wav");
        assert_eq!(content[1]["text"], "what is said?");
    }

    #[test]
    fn chat_body_audio_only() {
        let body = chat_body("m", &request(None, None));
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"].as_array().unwrap().len(), 1);
        assert_eq!(body["modalities"], json!(["text"]));
    }

    #[test]
    fn blank_key_is_not_sent() {
        let settings = ApiSettings {
            api_key: Some("  ".into()),
            base_url: "http://localhost:9/v1/".into(),
            ..ApiSettings::default()
        };
        let api = OpenAiSpeechApi::new(&settings).unwrap();
        assert!(api.api_key.is_none());
        assert_eq!(api.base_url, "http://localhost:9/v1");
    }
}
