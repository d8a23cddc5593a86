//! Transcription request model and enhancement templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::audio::AudioFile;

/// Shape of the transcript returned to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// The concatenated transcript as plain text.
    #[default]
    Text,
    /// Timestamped segments on the source timeline.
    Segments,
}

impl ResponseFormat {
    /// The `response_format` value sent to the remote transcription endpoint.
    pub fn api_value(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Segments => "verbose_json",
        }
    }
}

/// Named instruction template that steers transcription style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementProfile {
    /// No template; the caller's prompt (if any) is used as-is.
    #[default]
    None,
    /// Verbatim transcript with non-verbal cues and filler words.
    Detailed,
    /// Natural narrative flow with emotional context.
    Storytelling,
    /// Clean, fully punctuated business transcript.
    Professional,
    /// Precise technical transcript preserving terminology and pacing.
    Analytical,
}

const DETAILED_TEMPLATE: &str = "The following is a detailed transcript that includes all verbal and non-verbal elements. \
Background noises are noted in [brackets]. Speech characteristics like [pause], [laughs], and [sighs] \
are preserved. Filler words like 'um', 'uh', 'like', 'you know' are included. \
Hello... [deep breath] Let me explain what I mean by that. [background noise] You know, it's like...";

const STORYTELLING_TEMPLATE: &str = "The following is a natural conversation with proper punctuation and flow. \
Each speaker's words are captured in a paragraph with emotional context preserved. \
Hello! I'm excited to share this story with you. It began on a warm summer morning...";

const PROFESSIONAL_TEMPLATE: &str = "The following is a clear, professional transcript with proper capitalization and punctuation. \
Each sentence is complete and properly structured. Technical terms and acronyms are preserved exactly. \
The model will try to match the style and formatting of your prompt.";

const ANALYTICAL_TEMPLATE: &str = "The following is a precise technical transcript that preserves speech patterns and terminology. \
Note changes in speaking pace, emphasis, and technical terms exactly as spoken. \
Preserve specialized vocabulary, acronyms, and technical jargon with high fidelity. \
Example: The API endpoint /v1/completions [spoken slowly] accepts JSON payloads \
with a maximum token count of 4096 [emphasis on numbers].";

impl EnhancementProfile {
    /// The four profiles that carry a template.
    pub const TEMPLATED: [EnhancementProfile; 4] = [
        Self::Detailed,
        Self::Storytelling,
        Self::Professional,
        Self::Analytical,
    ];

    /// Fixed instruction template, or `None` for [`EnhancementProfile::None`].
    pub fn template(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Detailed => Some(DETAILED_TEMPLATE),
            Self::Storytelling => Some(STORYTELLING_TEMPLATE),
            Self::Professional => Some(PROFESSIONAL_TEMPLATE),
            Self::Analytical => Some(ANALYTICAL_TEMPLATE),
        }
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Detailed => "detailed",
            Self::Storytelling => "storytelling",
            Self::Professional => "professional",
            Self::Analytical => "analytical",
        }
    }
}

impl FromStr for EnhancementProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "detailed" => Ok(Self::Detailed),
            "storytelling" => Ok(Self::Storytelling),
            "professional" => Ok(Self::Professional),
            "analytical" => Ok(Self::Analytical),
            other => Err(format!("unknown enhancement profile: {other}")),
        }
    }
}

impl fmt::Display for EnhancementProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable transcription request.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptionRequest {
    source: AudioFile,
    prompt: Option<String>,
    response_format: ResponseFormat,
    enhancement: EnhancementProfile,
}

impl TranscriptionRequest {
    /// Plain transcription of `source` with an optional style hint.
    pub fn new(source: AudioFile, response_format: ResponseFormat, prompt: Option<String>) -> Self {
        Self {
            source,
            prompt: prompt.filter(|p| !p.trim().is_empty()),
            response_format,
            enhancement: EnhancementProfile::None,
        }
    }

    /// Transcription steered by an enhancement profile.
    ///
    /// The profile's template replaces any free-form prompt.
    pub fn enhanced(
        source: AudioFile,
        response_format: ResponseFormat,
        enhancement: EnhancementProfile,
    ) -> Self {
        Self {
            source,
            prompt: None,
            response_format,
            enhancement,
        }
    }

    /// The audio to transcribe.
    pub fn source(&self) -> &AudioFile {
        &self.source
    }

    /// Requested transcript shape.
    pub fn response_format(&self) -> ResponseFormat {
        self.response_format
    }

    /// Selected enhancement profile.
    pub fn enhancement(&self) -> EnhancementProfile {
        self.enhancement
    }

    /// The prompt sent to the remote model: the profile template when one is
    /// selected, otherwise the caller's hint.
    pub fn effective_prompt(&self) -> Option<&str> {
        self.enhancement.template().or(self.prompt.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp3() -> AudioFile {
        AudioFile::new("/tmp/a.mp3", 10).unwrap()
    }

    #[test]
    fn every_templated_profile_has_nonempty_template() {
        for profile in EnhancementProfile::TEMPLATED {
            let template = profile.template().unwrap();
            assert!(template.starts_with("The following is"));
        }
        assert!(EnhancementProfile::None.template().is_none());
    }

    #[test]
    fn templates_are_distinct() {
        let mut seen: Vec<&str> = EnhancementProfile::TEMPLATED
            .iter()
            .filter_map(|p| p.template())
            .collect();
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn profile_parse_roundtrip() {
        for profile in EnhancementProfile::TEMPLATED {
            assert_eq!(profile.as_str().parse::<EnhancementProfile>().unwrap(), profile);
        }
        assert!("poetic".parse::<EnhancementProfile>().is_err());
    }

    #[test]
    fn enhanced_request_uses_template_as_prompt() {
        let req = TranscriptionRequest::enhanced(mp3(), ResponseFormat::Text, EnhancementProfile::Analytical);
        assert_eq!(req.effective_prompt(), EnhancementProfile::Analytical.template());
    }

    #[test]
    fn plain_request_keeps_caller_prompt() {
        let req = TranscriptionRequest::new(mp3(), ResponseFormat::Segments, Some("Dr. Smith".into()));
        assert_eq!(req.effective_prompt(), Some("Dr. Smith"));
        assert_eq!(req.response_format().api_value(), "verbose_json");
    }

    #[test]
    fn blank_prompt_is_dropped() {
        let req = TranscriptionRequest::new(mp3(), ResponseFormat::Text, Some("   ".into()));
        assert!(req.effective_prompt().is_none());
    }
}
