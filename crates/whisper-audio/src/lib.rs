//! # whisper-audio
//!
//! Local audio handling for the whisper tool server.
//!
//! - [`FileInspector`]: path resolution, base-directory containment, and
//!   metadata for input files
//! - [`ChunkPlanner`]: decides whether a file must be split before upload and
//!   materializes the chunks
//! - [`AudioTranscoder`]: format conversion and size-budgeted compression
//! - [`AudioCodec`]: the backend seam, implemented by [`FfmpegCodec`]
//! - [`ScratchDir`]: per-operation temporary directories

#![deny(unsafe_code)]

pub mod chunking;
pub mod codec;
pub mod errors;
pub mod inspect;
pub mod path;
pub mod scratch;
pub mod transcoder;

pub use chunking::{Chunk, ChunkPlan, ChunkPlanner, PreparedChunk};
pub use codec::{AudioCodec, EncodeOptions, FfmpegCodec};
pub use errors::AudioError;
pub use inspect::{FileDescription, FileInspector};
pub use scratch::ScratchDir;
pub use transcoder::{AudioTranscoder, CONVERSION_TARGETS, Compression};
