//! Path resolution utilities.
//!
//! Expands `~`, resolves relative paths against a base directory, and
//! normalizes `.`/`..` lexically so containment can be checked before any
//! filesystem access.

use std::path::{Component, Path, PathBuf};

/// Resolve `file_path` against `base`.
///
/// - `~` and `~/...` expand to the home directory.
/// - Absolute paths are returned unchanged.
/// - Relative paths are joined with `base`.
pub fn resolve_path(file_path: &str, base: &Path) -> PathBuf {
    let expanded = expand_home(file_path.trim());
    let path = Path::new(&expanded);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Expand a leading `~` or `~/` to the user's home directory.
///
/// Does not expand `~user` forms.
pub fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return path.replacen('~', &home, 1);
        }
    }
    path.to_owned()
}

/// Remove `.` components and fold `..` into their parent without touching
/// the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let _ = out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `<dir>/<stem><suffix>.<ext>` next to `path`.
pub fn sibling_with(path: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "audio".to_string(), |s| s.to_string_lossy().into_owned());
    path.with_file_name(format!("{stem}{suffix}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_absolute_path_unchanged() {
        let result = resolve_path("/srv/audio/a.mp3", Path::new("/home/user"));
        assert_eq!(result, PathBuf::from("/srv/audio/a.mp3"));
    }

    #[test]
    fn resolve_relative_path_joined() {
        let result = resolve_path("talks/a.mp3", Path::new("/srv/audio"));
        assert_eq!(result, PathBuf::from("/srv/audio/talks/a.mp3"));
    }

    #[test]
    fn expand_home_tilde() {
        let result = expand_home("~/clips/a.wav");
        assert!(!result.starts_with('~'));
        assert!(result.ends_with("/clips/a.wav"));
        assert_eq!(expand_home("/absolute/path"), "/absolute/path");
        assert_eq!(expand_home("~bob/a.wav"), "~bob/a.wav");
    }

    #[test]
    fn normalize_folds_parent_references() {
        assert_eq!(
            normalize_lexically(Path::new("/srv/audio/../etc/./passwd")),
            PathBuf::from("/srv/etc/passwd")
        );
        assert_eq!(normalize_lexically(Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn sibling_paths() {
        assert_eq!(
            sibling_with(Path::new("/srv/a/talk.wav"), "_compressed", "mp3"),
            PathBuf::from("/srv/a/talk_compressed.mp3")
        );
        assert_eq!(
            sibling_with(Path::new("/srv/a/talk.wav"), "", "mp3"),
            PathBuf::from("/srv/a/talk.mp3")
        );
    }
}
