//! The closed set of operations and their typed parameters.
//!
//! Each [`Operation`] owns its wire name, its JSON schema, and a parser that
//! turns raw JSON arguments into [`OperationParams`]. Parsing is pure: it
//! touches neither the filesystem nor the network.

use std::fmt;

use serde_json::Value;
use whisper_audio::CONVERSION_TARGETS;
use whisper_core::{AudioFormat, EnhancementProfile, ResponseFormat, Tool};
use whisper_speech::{CHAT_MODELS, SPEECH_MODELS, Voice};

use crate::errors::ToolError;
use crate::utils::schema::SchemaBuilder;
use crate::utils::validation::{
    ensure_object, ensure_range, get_optional_enum, get_optional_f64, get_optional_string,
    validate_required_string,
};

/// Default compression budget in megabytes.
pub const DEFAULT_MAX_MB: f64 = 25.0;
/// Slowest synthesis speed.
pub const MIN_SPEED: f64 = 0.25;
/// Fastest synthesis speed.
pub const MAX_SPEED: f64 = 4.0;

/// Every operation the router can dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Plain transcription.
    Transcribe,
    /// Transcription steered by an enhancement template.
    TranscribeEnhanced,
    /// Ask the audio chat model about a clip.
    ChatWithAudio,
    /// Change container format.
    Convert,
    /// Shrink a file under a size budget.
    Compress,
    /// Text to speech.
    CreateSpeech,
    /// Report whether and how a file can be used.
    GetFileSupport,
}

impl Operation {
    /// Every operation, in registration order.
    pub const ALL: [Operation; 7] = [
        Operation::Transcribe,
        Operation::TranscribeEnhanced,
        Operation::ChatWithAudio,
        Operation::Convert,
        Operation::Compress,
        Operation::CreateSpeech,
        Operation::GetFileSupport,
    ];

    /// Tool name seen by hosts.
    pub fn name(self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe_audio",
            Self::TranscribeEnhanced => "transcribe_with_enhancement",
            Self::ChatWithAudio => "chat_with_audio",
            Self::Convert => "convert_audio",
            Self::Compress => "compress_audio",
            Self::CreateSpeech => "create_speech",
            Self::GetFileSupport => "get_file_support",
        }
    }

    /// Whether the operation calls the remote API.
    pub fn needs_api(self) -> bool {
        matches!(
            self,
            Self::Transcribe | Self::TranscribeEnhanced | Self::ChatWithAudio | Self::CreateSpeech
        )
    }

    /// Schema advertised to tool hosts.
    pub fn definition(self) -> Tool {
        let (description, schema) = match self {
            Self::Transcribe => (
                "Transcribe an audio file to text. Files above the upload limit are split automatically.",
                SchemaBuilder::new()
                    .string("input_file_path", "Path to the input audio file", true)
                    .string_enum(
                        "response_format",
                        "Plain text, or text with timed segments",
                        &["text", "segments"],
                        Some("text"),
                    )
                    .string("prompt", "Optional context or spelling hints for the model", false),
            ),
            Self::TranscribeEnhanced => (
                "Transcribe an audio file using a predefined style template.",
                SchemaBuilder::new()
                    .string("input_file_path", "Path to the input audio file", true)
                    .string_enum(
                        "enhancement_type",
                        "Transcription style",
                        &["detailed", "storytelling", "professional", "analytical"],
                        None,
                    )
                    .string_enum(
                        "response_format",
                        "Plain text, or text with timed segments",
                        &["text", "segments"],
                        Some("text"),
                    ),
            ),
            Self::ChatWithAudio => (
                "Ask an audio-capable model about an mp3 or wav file.",
                SchemaBuilder::new()
                    .string("input_file_path", "Path to the input audio file (mp3 or wav)", true)
                    .string("system_prompt", "Optional system instructions", false)
                    .string("user_prompt", "Optional question about the audio", false)
                    .string_enum("model", "Audio chat model (default: configured chat model)", &CHAT_MODELS, None),
            ),
            Self::Convert => (
                "Convert an audio file to mp3 or wav.",
                SchemaBuilder::new()
                    .string("input_file_path", "Path to the input audio file", true)
                    .string_enum("target_format", "Output format", &["mp3", "wav"], Some("mp3"))
                    .string(
                        "output_file_path",
                        "Where to write the result (default: input path with the new extension)",
                        false,
                    ),
            ),
            Self::Compress => (
                "Compress an audio file to mp3 under a size budget.",
                SchemaBuilder::new()
                    .string("input_file_path", "Path to the input audio file", true)
                    .number("max_mb", "Maximum output size in megabytes", Some(0.0), None, Some(DEFAULT_MAX_MB))
                    .string(
                        "output_file_path",
                        "Where to write the result (default: <name>_compressed.mp3 beside the input)",
                        false,
                    ),
            ),
            Self::CreateSpeech => (
                "Generate spoken audio (mp3) from text.",
                SchemaBuilder::new()
                    .string("text_prompt", "Text to speak", true)
                    .string_enum("voice", "Voice to use", &voice_names(), Some(Voice::default().as_str()))
                    .number("speed", "Playback speed", Some(MIN_SPEED), Some(MAX_SPEED), Some(1.0))
                    .string_enum("model", "Speech model (default: configured speech model)", &SPEECH_MODELS, None)
                    .string("output_file_path", "Where to write the mp3 (default: output directory)", false),
            ),
            Self::GetFileSupport => (
                "Report whether a file is a supported audio format and which models accept it.",
                SchemaBuilder::new().string("file_path", "Path to the file to inspect", true),
            ),
        };
        Tool {
            name: self.name().into(),
            description: description.into(),
            input_schema: schema.build(),
        }
    }

    /// Validate `params` for this operation.
    pub fn parse(self, params: &Value) -> Result<OperationParams, ToolError> {
        ensure_object(params)?;
        Ok(match self {
            Self::Transcribe => OperationParams::Transcribe {
                input_file_path: input_path(params)?,
                response_format: response_format(params)?,
                prompt: get_optional_string(params, "prompt")?,
            },
            Self::TranscribeEnhanced => {
                let enhancement = get_optional_enum::<EnhancementProfile>(
                    params,
                    "enhancement_type",
                    &["detailed", "storytelling", "professional", "analytical"],
                )?
                .ok_or_else(|| ToolError::validation("missing required parameter 'enhancement_type'"))?;
                OperationParams::TranscribeEnhanced {
                    input_file_path: input_path(params)?,
                    enhancement,
                    response_format: response_format(params)?,
                }
            }
            Self::ChatWithAudio => OperationParams::ChatWithAudio {
                input_file_path: input_path(params)?,
                system_prompt: get_optional_string(params, "system_prompt")?,
                user_prompt: get_optional_string(params, "user_prompt")?,
                model: get_optional_enum(params, "model", &CHAT_MODELS)?,
            },
            Self::Convert => {
                let targets: Vec<&str> = CONVERSION_TARGETS.iter().map(|f| f.extension()).collect();
                OperationParams::Convert {
                    input_file_path: input_path(params)?,
                    target_format: get_optional_enum(params, "target_format", &targets)?
                        .unwrap_or(AudioFormat::Mp3),
                    output_file_path: get_optional_string(params, "output_file_path")?,
                }
            }
            Self::Compress => {
                let max_mb = get_optional_f64(params, "max_mb")?.unwrap_or(DEFAULT_MAX_MB);
                if max_mb <= 0.0 {
                    return Err(ToolError::validation(format!(
                        "parameter 'max_mb' must be greater than 0, got {max_mb}"
                    )));
                }
                OperationParams::Compress {
                    input_file_path: input_path(params)?,
                    max_mb,
                    output_file_path: get_optional_string(params, "output_file_path")?,
                }
            }
            Self::CreateSpeech => {
                let speed = get_optional_f64(params, "speed")?.unwrap_or(1.0);
                let output_file_path = get_optional_string(params, "output_file_path")?;
                if let Some(out) = &output_file_path {
                    if !out.to_ascii_lowercase().ends_with(".mp3") {
                        return Err(ToolError::validation(format!(
                            "parameter 'output_file_path' must end in .mp3, got '{out}'"
                        )));
                    }
                }
                OperationParams::CreateSpeech {
                    text_prompt: validate_required_string(params, "text_prompt", "text to speak")?,
                    voice: get_optional_enum(params, "voice", &voice_names())?.unwrap_or_default(),
                    speed: ensure_range("speed", speed, MIN_SPEED, MAX_SPEED)?,
                    model: get_optional_enum(params, "model", &SPEECH_MODELS)?,
                    output_file_path,
                }
            }
            Self::GetFileSupport => OperationParams::GetFileSupport {
                file_path: validate_required_string(params, "file_path", "file to inspect")?,
            },
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated parameters, one variant per [`Operation`].
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum OperationParams {
    Transcribe {
        input_file_path: String,
        response_format: ResponseFormat,
        prompt: Option<String>,
    },
    TranscribeEnhanced {
        input_file_path: String,
        enhancement: EnhancementProfile,
        response_format: ResponseFormat,
    },
    ChatWithAudio {
        input_file_path: String,
        system_prompt: Option<String>,
        user_prompt: Option<String>,
        model: Option<String>,
    },
    Convert {
        input_file_path: String,
        target_format: AudioFormat,
        output_file_path: Option<String>,
    },
    Compress {
        input_file_path: String,
        max_mb: f64,
        output_file_path: Option<String>,
    },
    CreateSpeech {
        text_prompt: String,
        voice: Voice,
        speed: f64,
        model: Option<String>,
        output_file_path: Option<String>,
    },
    GetFileSupport {
        file_path: String,
    },
}

fn input_path(params: &Value) -> Result<String, ToolError> {
    validate_required_string(params, "input_file_path", "path to the input audio file")
}

fn response_format(params: &Value) -> Result<ResponseFormat, ToolError> {
    let format = get_optional_string(params, "response_format")?;
    match format.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("text") => Ok(ResponseFormat::Text),
        Some("segments") => Ok(ResponseFormat::Segments),
        Some(other) => Err(ToolError::validation(format!(
            "parameter 'response_format' must be one of text, segments, got '{other}'"
        ))),
    }
}

fn voice_names() -> Vec<&'static str> {
    Voice::ALL.iter().map(|v| v.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = Operation::ALL.iter().map(|o| o.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Operation::ALL.len());
    }

    #[test]
    fn remote_operations() {
        let remote: Vec<_> = Operation::ALL.into_iter().filter(|o| o.needs_api()).collect();
        assert_eq!(
            remote,
            vec![
                Operation::Transcribe,
                Operation::TranscribeEnhanced,
                Operation::ChatWithAudio,
                Operation::CreateSpeech
            ]
        );
    }

    #[test]
    fn transcribe_defaults_to_text() {
        let params = Operation::Transcribe
            .parse(&json!({"input_file_path": "/a/talk.mp3"}))
            .unwrap();
        assert_matches!(
            params,
            OperationParams::Transcribe { response_format: ResponseFormat::Text, prompt: None, .. }
        );
    }

    #[test]
    fn transcribe_rejects_unknown_response_format() {
        let err = Operation::Transcribe
            .parse(&json!({"input_file_path": "/a.mp3", "response_format": "srt"}))
            .unwrap_err();
        assert!(err.to_string().contains("response_format"));
    }

    #[test]
    fn enhancement_is_required_and_closed() {
        let missing = Operation::TranscribeEnhanced
            .parse(&json!({"input_file_path": "/a.mp3"}))
            .unwrap_err();
        assert!(missing.to_string().contains("enhancement_type"));

        let unknown = Operation::TranscribeEnhanced
            .parse(&json!({"input_file_path": "/a.mp3", "enhancement_type": "poetic"}))
            .unwrap_err();
        assert!(unknown.to_string().contains("poetic"));

        let ok = Operation::TranscribeEnhanced
            .parse(&json!({"input_file_path": "/a.mp3", "enhancement_type": "analytical"}))
            .unwrap();
        assert_matches!(
            ok,
            OperationParams::TranscribeEnhanced { enhancement: EnhancementProfile::Analytical, .. }
        );
    }

    #[test]
    fn convert_only_to_mp3_or_wav() {
        let err = Operation::Convert
            .parse(&json!({"input_file_path": "/a.wav", "target_format": "flac"}))
            .unwrap_err();
        assert_matches!(err, ToolError::Validation { .. });

        let ok = Operation::Convert.parse(&json!({"input_file_path": "/a.mp3"})).unwrap();
        assert_matches!(ok, OperationParams::Convert { target_format: AudioFormat::Mp3, .. });
    }

    #[test]
    fn compress_budget_must_be_positive() {
        for bad in [json!(0), json!(-3.5)] {
            let err = Operation::Compress
                .parse(&json!({"input_file_path": "/a.wav", "max_mb": bad}))
                .unwrap_err();
            assert!(err.to_string().contains("max_mb"));
        }
        let ok = Operation::Compress.parse(&json!({"input_file_path": "/a.wav"})).unwrap();
        assert_matches!(ok, OperationParams::Compress { max_mb, .. } if max_mb == DEFAULT_MAX_MB);
    }

    #[test]
    fn speech_defaults_and_ranges() {
        let ok = Operation::CreateSpeech.parse(&json!({"text_prompt": "Hello"})).unwrap();
        assert_matches!(
            ok,
            OperationParams::CreateSpeech { voice: Voice::Nova, speed, output_file_path: None, .. } if speed == 1.0
        );

        let slow = Operation::CreateSpeech
            .parse(&json!({"text_prompt": "Hello", "speed": 0.1}))
            .unwrap_err();
        assert!(slow.to_string().contains("speed"));

        let voice = Operation::CreateSpeech
            .parse(&json!({"text_prompt": "Hello", "voice": "robot"}))
            .unwrap_err();
        assert!(voice.to_string().contains("voice"));

        let ext = Operation::CreateSpeech
            .parse(&json!({"text_prompt": "Hello", "output_file_path": "/tmp/out.wav"}))
            .unwrap_err();
        assert!(ext.to_string().contains(".mp3"));
    }

    #[test]
    fn model_overrides_come_from_each_catalog() {
        let chat = Operation::ChatWithAudio
            .parse(&json!({"input_file_path": "/a.wav", "model": "gpt-4o-mini-audio-preview-2024-12-17"}))
            .unwrap();
        assert_matches!(
            chat,
            OperationParams::ChatWithAudio { model: Some(m), .. } if m == "gpt-4o-mini-audio-preview-2024-12-17"
        );

        let speech = Operation::CreateSpeech
            .parse(&json!({"text_prompt": "Hello", "model": "tts-1-hd"}))
            .unwrap();
        assert_matches!(speech, OperationParams::CreateSpeech { model: Some(m), .. } if m == "tts-1-hd");

        let default = Operation::CreateSpeech.parse(&json!({"text_prompt": "Hello"})).unwrap();
        assert_matches!(default, OperationParams::CreateSpeech { model: None, .. });

        let crossed = Operation::ChatWithAudio
            .parse(&json!({"input_file_path": "/a.wav", "model": "tts-1"}))
            .unwrap_err();
        assert_matches!(crossed, ToolError::Validation { .. });
        assert!(crossed.to_string().contains("model"));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(Operation::GetFileSupport.parse(&json!("file.mp3")).is_err());
    }

    #[test]
    fn definitions_require_the_path_parameter() {
        for op in Operation::ALL {
            let def = op.definition();
            assert_eq!(def.name, op.name());
            let key = match op {
                Operation::CreateSpeech => "text_prompt",
                Operation::GetFileSupport => "file_path",
                _ => "input_file_path",
            };
            assert!(def.input_schema.is_required(key), "{op} should require {key}");
        }
    }
}
