//! Audio component error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use whisper_core::FormatError;

/// Errors raised by the inspector, planner, transcoder, and codec.
#[derive(Debug, Error)]
pub enum AudioError {
    /// Extension outside the supported set.
    #[error(transparent)]
    UnsupportedFormat(#[from] FormatError),

    /// Filesystem failure on a specific path.
    #[error("{}", format_io_error(.source, .path))]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A directory was given where a file was expected.
    #[error("is a directory: {}", .path.display())]
    IsDirectory {
        /// The directory path.
        path: PathBuf,
    },

    /// The resolved path escapes the configured base directory.
    #[error("path is outside the allowed directory: {}", .path.display())]
    OutsideBaseDir {
        /// The rejected path.
        path: PathBuf,
    },

    /// An output path is unusable (e.g. it would overwrite the input).
    #[error("invalid output path {}: {reason}", .path.display())]
    InvalidOutput {
        /// The rejected output path.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// The requested conversion target is not offered.
    #[error("cannot convert to {format}; supported targets are mp3 and wav")]
    InvalidTarget {
        /// The requested target format.
        format: whisper_core::AudioFormat,
    },

    /// Splitting needs a duration the codec could not determine.
    #[error("could not determine duration of {}", .path.display())]
    DurationUnknown {
        /// The file being planned.
        path: PathBuf,
    },

    /// A segment stayed above the ceiling after every split attempt.
    #[error("chunk {index} is {size_bytes} bytes, above the {ceiling_bytes}-byte ceiling after {attempts} split attempts")]
    ChunkTooLarge {
        /// Index of the oversized chunk in the last plan.
        index: usize,
        /// Its measured size.
        size_bytes: u64,
        /// The original ceiling.
        ceiling_bytes: u64,
        /// Plans tried.
        attempts: u32,
    },

    /// Even the lowest rung of the quality ladder exceeds the budget.
    #[error("cannot compress below {max_bytes} bytes; smallest encode was {smallest_bytes} bytes")]
    QualityFloor {
        /// Requested budget.
        max_bytes: u64,
        /// Size of the lowest-quality encode.
        smallest_bytes: u64,
    },

    /// The codec backend failed.
    #[error("codec error: {message}")]
    Codec {
        /// Description of the failure (stderr tail for subprocesses).
        message: String,
    },

    /// A codec subprocess exceeded its time budget.
    #[error("codec timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },
}

impl AudioError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_io_error(err: &io::Error, path: &std::path::Path) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => format!("file not found: {}", path.display()),
        io::ErrorKind::PermissionDenied => format!("permission denied: {}", path.display()),
        _ => format!("{}: {err}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_path() {
        let err = AudioError::io("/tmp/missing.mp3", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "file not found: /tmp/missing.mp3");
    }

    #[test]
    fn other_io_errors_keep_source_text() {
        let err = AudioError::io("/tmp/a.mp3", io::Error::other("disk on fire"));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn unsupported_format_is_transparent() {
        let err: AudioError = FormatError::Unsupported {
            extension: "txt".into(),
        }
        .into();
        assert_eq!(err.to_string(), "unsupported audio format: txt");
    }

    #[test]
    fn quality_floor_display() {
        let err = AudioError::QualityFloor {
            max_bytes: 100,
            smallest_bytes: 250,
        };
        assert!(err.to_string().contains("250"));
    }
}
