//! Input path resolution and validation.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use whisper_core::{AudioFile, AudioFormat};

use crate::codec::AudioCodec;
use crate::errors::AudioError;
use crate::path::{normalize_lexically, resolve_path};

/// Metadata for any file, supported or not.
#[derive(Clone, Debug, PartialEq)]
pub struct FileDescription {
    /// Resolved path.
    pub path: PathBuf,
    /// Lowercased extension without the dot (empty when absent).
    pub extension: String,
    /// Parsed format, `None` when the extension is unsupported.
    pub format: Option<AudioFormat>,
    /// Size on disk.
    pub size_bytes: u64,
    /// Last-modified time.
    pub modified: Option<DateTime<Utc>>,
    /// Probed duration; `None` for unsupported files or when probing fails.
    pub duration_secs: Option<f64>,
}

impl FileDescription {
    /// Whether the remote transcription endpoint accepts this file.
    pub fn supported(&self) -> bool {
        self.format.is_some()
    }
}

/// Resolves caller-supplied paths and turns them into [`AudioFile`]s.
///
/// When a base directory is configured, every input and output path must
/// stay inside it, both lexically and after symlinks are resolved.
#[derive(Clone)]
pub struct FileInspector {
    base_dir: Option<PathBuf>,
    codec: Arc<dyn AudioCodec>,
}

impl FileInspector {
    /// Create an inspector.
    pub fn new(base_dir: Option<PathBuf>, codec: Arc<dyn AudioCodec>) -> Self {
        Self {
            base_dir: base_dir.map(|d| normalize_lexically(&d)),
            codec,
        }
    }

    /// Resolve `raw` to an absolute, normalized path inside the base
    /// directory. No filesystem access besides reading the working directory.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, AudioError> {
        let anchor = match &self.base_dir {
            Some(base) => base.clone(),
            None => std::env::current_dir().map_err(|e| AudioError::io(".", e))?,
        };
        let resolved = normalize_lexically(&resolve_path(raw, &anchor));
        if let Some(base) = &self.base_dir {
            if !resolved.starts_with(base) {
                return Err(AudioError::OutsideBaseDir { path: resolved });
            }
        }
        Ok(resolved)
    }

    /// Resolve and validate an input audio file.
    ///
    /// The extension is checked before any I/O; a single stat then
    /// establishes existence, size, and modification time.
    pub async fn inspect(&self, raw: &str) -> Result<AudioFile, AudioError> {
        let path = self.resolve(raw)?;
        let _ = AudioFormat::from_path(&path)?;

        let meta = self.stat_file(&path).await?;
        self.ensure_contained(&path).await?;

        let mut file = AudioFile::new(path, meta.len())?;
        if let Some(modified) = modified_time(&meta) {
            file = file.with_modified(modified);
        }
        debug!(path = %file.path().display(), size_bytes = file.size_bytes(), format = %file.format(), "inspected input");
        Ok(file)
    }

    /// Describe any file without rejecting unsupported extensions.
    ///
    /// Durations are probed for supported files only; a failed probe is
    /// reported as an unknown duration.
    pub async fn describe(&self, raw: &str) -> Result<FileDescription, AudioError> {
        let path = self.resolve(raw)?;
        let meta = self.stat_file(&path).await?;
        self.ensure_contained(&path).await?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let format = AudioFormat::from_path(&path).ok();

        let duration_secs = if format.is_some() {
            match self.codec.probe_duration(&path).await {
                Ok(secs) => Some(secs),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "duration probe failed");
                    None
                }
            }
        } else {
            None
        };

        Ok(FileDescription {
            extension,
            format,
            size_bytes: meta.len(),
            modified: modified_time(&meta),
            duration_secs,
            path,
        })
    }

    /// Resolve an output path, applying the same containment rules as
    /// inputs. The file itself need not exist.
    ///
    /// The nearest existing ancestor is canonicalized and must lie inside
    /// the base, so a symlinked directory cannot carry writes out of it.
    /// A dangling symlink on the way is rejected.
    pub async fn resolve_output(&self, raw: &str) -> Result<PathBuf, AudioError> {
        let path = self.resolve(raw)?;
        let Some(base) = &self.base_dir else {
            return Ok(path);
        };
        let Ok(real_base) = tokio::fs::canonicalize(base).await else {
            return Err(AudioError::OutsideBaseDir { path });
        };

        let mut inside = false;
        for ancestor in path.ancestors() {
            match tokio::fs::canonicalize(ancestor).await {
                Ok(real) => {
                    inside = real.starts_with(&real_base);
                    break;
                }
                // exists but cannot be resolved
                Err(_) if tokio::fs::symlink_metadata(ancestor).await.is_ok() => break,
                Err(_) => {}
            }
        }

        if inside {
            Ok(path)
        } else {
            debug!(path = %path.display(), "output escapes base directory");
            Err(AudioError::OutsideBaseDir { path })
        }
    }

    async fn stat_file(&self, path: &Path) -> Result<Metadata, AudioError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| AudioError::io(path, e))?;
        if meta.is_dir() {
            return Err(AudioError::IsDirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(meta)
    }

    /// Symlink-aware containment check for an existing path.
    async fn ensure_contained(&self, path: &Path) -> Result<(), AudioError> {
        let Some(base) = &self.base_dir else {
            return Ok(());
        };
        let real = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| AudioError::io(path, e))?;
        let real_base = tokio::fs::canonicalize(base)
            .await
            .map_err(|e| AudioError::io(base, e))?;
        if real.starts_with(&real_base) {
            Ok(())
        } else {
            Err(AudioError::OutsideBaseDir {
                path: path.to_path_buf(),
            })
        }
    }
}

fn modified_time(meta: &Metadata) -> Option<DateTime<Utc>> {
    meta.modified().ok().map(DateTime::<Utc>::from)
}
