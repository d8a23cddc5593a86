//! Per-operation scratch directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use whisper_core::AudioFormat;

use crate::errors::AudioError;

/// A uniquely named temporary directory for intermediate files.
///
/// The directory and everything in it are removed when the value is dropped,
/// whether the owning operation succeeded, failed, or was cancelled.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a scratch directory under `parent` (created if missing).
    ///
    /// The directory calls run on the blocking pool.
    pub async fn new_in(parent: &Path) -> Result<Self, AudioError> {
        let owned = parent.to_path_buf();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&owned).map_err(|e| AudioError::io(&owned, e))?;
            let dir = tempfile::Builder::new()
                .prefix(".whisper-scratch-")
                .tempdir_in(&owned)
                .map_err(|e| AudioError::io(&owned, e))?;
            Ok(Self { dir })
        })
        .await
        .map_err(|e| AudioError::io(parent, std::io::Error::other(e)))?
    }

    /// Root of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a named intermediate file, e.g. `chunk-003.mp3`.
    pub fn file(&self, name: &str, format: AudioFormat) -> PathBuf {
        self.dir.path().join(format!("{name}.{format}"))
    }
}
