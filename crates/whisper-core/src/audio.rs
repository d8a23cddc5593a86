//! Audio format detection and the inspected-file model.
//!
//! [`AudioFormat`] is the closed set of container extensions the remote
//! transcription endpoint accepts. An [`AudioFile`] can only be built for a
//! path whose extension parses into one of them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported audio container formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-1 Audio Layer III.
    Mp3,
    /// RIFF WAVE.
    Wav,
    /// Free Lossless Audio Codec.
    Flac,
    /// MPEG-4 container.
    Mp4,
    /// MPEG audio stream.
    Mpeg,
    /// MPEG audio (`.mpga`).
    Mpga,
    /// MPEG-4 audio.
    M4a,
    /// Ogg container.
    Ogg,
}

/// Error raised when an extension is outside the supported set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The path has no extension at all.
    #[error("file has no extension: {path}")]
    MissingExtension {
        /// The offending path.
        path: String,
    },
    /// The extension is not a supported audio format.
    #[error("unsupported audio format: {extension}")]
    Unsupported {
        /// The extension as given (lowercased, without the dot).
        extension: String,
    },
}

impl AudioFormat {
    /// Every supported format, in a stable order.
    pub const ALL: [AudioFormat; 8] = [
        Self::Mp3,
        Self::Wav,
        Self::Flac,
        Self::Mp4,
        Self::Mpeg,
        Self::Mpga,
        Self::M4a,
        Self::Ogg,
    ];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Mp4 => "mp4",
            Self::Mpeg => "mpeg",
            Self::Mpga => "mpga",
            Self::M4a => "m4a",
            Self::Ogg => "ogg",
        }
    }

    /// MIME type used for multipart uploads.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mp3 | Self::Mpeg | Self::Mpga => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Flac => "audio/flac",
            Self::Mp4 => "audio/mp4",
            Self::M4a => "audio/m4a",
            Self::Ogg => "audio/ogg",
        }
    }

    /// Whether the audio chat endpoint accepts this format as `input_audio`.
    pub fn supports_chat(self) -> bool {
        matches!(self, Self::Mp3 | Self::Wav)
    }

    /// Parse the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| FormatError::MissingExtension {
                path: path.display().to_string(),
            })?;
        ext.parse()
    }
}

impl FromStr for AudioFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == lower)
            .ok_or(FormatError::Unsupported { extension: lower })
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// An inspected audio file.
///
/// Created per invocation from a caller-supplied path. The duration is
/// unknown until a component that needs it probes the file.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    path: PathBuf,
    format: AudioFormat,
    size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<DateTime<Utc>>,
}

impl AudioFile {
    /// Build an audio file, rejecting paths outside the supported format set.
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Result<Self, FormatError> {
        let path = path.into();
        let format = AudioFormat::from_path(&path)?;
        Ok(Self {
            path,
            format,
            size_bytes,
            duration_secs: None,
            modified: None,
        })
    }

    /// Attach a known duration.
    #[must_use]
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Attach the last-modified timestamp.
    #[must_use]
    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Record a probed duration.
    pub fn set_duration(&mut self, secs: f64) {
        self.duration_secs = Some(secs);
    }

    /// Absolute path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detected container format.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Size on disk in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Size on disk in megabytes.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / crate::BYTES_PER_MB as f64
    }

    /// Duration in seconds, if it has been probed.
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    /// Last-modified time, if known.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    /// File name component, for multipart uploads.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| format!("audio.{}", self.format), |n| n.to_string_lossy().into_owned())
    }
}
