//! Format conversion and size-budgeted compression.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use whisper_core::{AudioFile, AudioFormat, BYTES_PER_MB};
use whisper_settings::QualityStep;

use crate::codec::{AudioCodec, EncodeOptions};
use crate::errors::AudioError;
use crate::path::{normalize_lexically, sibling_with};
use crate::scratch::ScratchDir;

/// Formats `convert` can produce.
pub const CONVERSION_TARGETS: [AudioFormat; 2] = [AudioFormat::Mp3, AudioFormat::Wav];

/// Outcome of a compression request.
#[derive(Clone, Debug, PartialEq)]
pub struct Compression {
    /// The file that fits the budget (the source when nothing was needed).
    pub file: AudioFile,
    /// Whether a new file was written.
    pub compressed: bool,
    /// The ladder rung that produced `file`.
    pub step: Option<QualityStep>,
}

/// Converts and compresses audio through the codec seam.
///
/// Encodes go to a scratch directory first and are moved to the output path
/// only once they are complete, so a failure never leaves a partial file.
#[derive(Clone)]
pub struct AudioTranscoder {
    codec: Arc<dyn AudioCodec>,
    ladder: Vec<QualityStep>,
    scratch_parent: PathBuf,
}

impl AudioTranscoder {
    /// Create a transcoder that stages intermediates under `scratch_parent`.
    pub fn new(codec: Arc<dyn AudioCodec>, ladder: Vec<QualityStep>, scratch_parent: PathBuf) -> Self {
        Self {
            codec,
            ladder,
            scratch_parent,
        }
    }

    /// Default output for a conversion: the input path with the new extension.
    pub fn default_convert_output(source: &AudioFile, target: AudioFormat) -> PathBuf {
        sibling_with(source.path(), "", target.extension())
    }

    /// Default output for compression: `<stem>_compressed.mp3` beside the input.
    pub fn default_compress_output(source: &AudioFile) -> PathBuf {
        sibling_with(source.path(), "_compressed", AudioFormat::Mp3.extension())
    }

    /// Convert `source` to `target`.
    ///
    /// Converting to the source's own format returns the source untouched.
    pub async fn convert(
        &self,
        source: &AudioFile,
        target: AudioFormat,
        output: Option<PathBuf>,
    ) -> Result<AudioFile, AudioError> {
        if !CONVERSION_TARGETS.contains(&target) {
            return Err(AudioError::InvalidTarget { format: target });
        }
        if target == source.format() {
            debug!(path = %source.path().display(), "source already in target format");
            return Ok(source.clone());
        }

        let output = output.unwrap_or_else(|| Self::default_convert_output(source, target));
        check_output(source, &output, &[target]).await?;

        let scratch = ScratchDir::new_in(&self.scratch_parent).await?;
        let staged = scratch.file("convert", target);
        self.codec
            .transcode(source.path(), &staged, &EncodeOptions::format(target))
            .await?;

        let file = move_into_place(&staged, &output).await?;
        info!(from = %source.format(), to = %target, output = %output.display(), "converted audio");
        Ok(file)
    }

    /// Compress `source` to at most `max_mb` megabytes.
    ///
    /// Walks the quality ladder from best to worst and keeps the first encode
    /// that fits. Fails with [`AudioError::QualityFloor`] when none does.
    pub async fn compress(
        &self,
        source: &AudioFile,
        max_mb: f64,
        output: Option<PathBuf>,
    ) -> Result<Compression, AudioError> {
        let max_bytes = (max_mb * BYTES_PER_MB as f64).floor().max(0.0) as u64;
        if source.size_bytes() <= max_bytes {
            debug!(size_bytes = source.size_bytes(), max_bytes, "no compression needed");
            return Ok(Compression {
                file: source.clone(),
                compressed: false,
                step: None,
            });
        }

        let output = output.unwrap_or_else(|| Self::default_compress_output(source));
        check_output(
            source,
            &output,
            &[AudioFormat::Mp3, AudioFormat::Mpeg, AudioFormat::Mpga],
        )
        .await?;

        let scratch = ScratchDir::new_in(&self.scratch_parent).await?;
        let mut smallest = u64::MAX;
        for (rung, step) in self.ladder.iter().enumerate() {
            let staged = scratch.file(&format!("rung-{rung}"), AudioFormat::Mp3);
            self.codec
                .transcode(
                    source.path(),
                    &staged,
                    &EncodeOptions::mp3(step.bitrate_kbps, step.sample_rate_hz),
                )
                .await?;
            let size = tokio::fs::metadata(&staged)
                .await
                .map_err(|e| AudioError::io(&staged, e))?
                .len();
            debug!(rung, bitrate_kbps = step.bitrate_kbps, size_bytes = size, max_bytes, "encoded rung");

            if size <= max_bytes {
                let file = move_into_place(&staged, &output).await?;
                info!(
                    from_bytes = source.size_bytes(),
                    to_bytes = size,
                    bitrate_kbps = step.bitrate_kbps,
                    output = %output.display(),
                    "compressed audio"
                );
                return Ok(Compression {
                    file,
                    compressed: true,
                    step: Some(*step),
                });
            }
            smallest = smallest.min(size);
        }

        Err(AudioError::QualityFloor {
            max_bytes,
            smallest_bytes: smallest,
        })
    }
}

/// Reject outputs that would clobber the input or carry the wrong extension.
async fn check_output(source: &AudioFile, output: &Path, allowed: &[AudioFormat]) -> Result<(), AudioError> {
    if normalize_lexically(output) == normalize_lexically(source.path()) || same_file(source.path(), output).await {
        return Err(AudioError::InvalidOutput {
            path: output.to_path_buf(),
            reason: "output would overwrite the input".into(),
        });
    }
    match AudioFormat::from_path(output) {
        Ok(format) if allowed.contains(&format) => Ok(()),
        _ => Err(AudioError::InvalidOutput {
            path: output.to_path_buf(),
            reason: format!("extension must be .{}", allowed[0]),
        }),
    }
}

async fn same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Move a finished encode to its destination, creating parent directories.
async fn move_into_place(staged: &Path, output: &Path) -> Result<AudioFile, AudioError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AudioError::io(parent, e))?;
    }
    if let Err(e) = tokio::fs::rename(staged, output).await {
        // Scratch and output may sit on different filesystems.
        debug!(output = %output.display(), error = %e, "rename failed, copying instead");
        place_by_copy(staged, output).await?;
    }
    let meta = tokio::fs::metadata(output)
        .await
        .map_err(|e| AudioError::io(output, e))?;
    Ok(AudioFile::new(output, meta.len())?)
}

/// Copy `staged` to a `.partial` sibling of `output`, then rename it over
/// `output`. On failure the sibling is removed and `output` is untouched.
async fn place_by_copy(staged: &Path, output: &Path) -> Result<(), AudioError> {
    let mut partial = output.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let placed = async {
        let _ = tokio::fs::copy(staged, &partial)
            .await
            .map_err(|e| AudioError::io(&partial, e))?;
        tokio::fs::rename(&partial, output)
            .await
            .map_err(|e| AudioError::io(output, e))
    }
    .await;
    if placed.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    placed
}
