//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`WhisperSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::WhisperSettings;

/// Resolve the path to the settings file (`~/.whisper-mcp/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".whisper-mcp").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<WhisperSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with process env var overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<WhisperSettings> {
    load_settings_with_env(path, |name| std::env::var(name).ok())
}

/// Load settings from `path`, reading overrides through `env`.
pub fn load_settings_with_env<F>(path: &Path, env: F) -> Result<WhisperSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(WhisperSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: WhisperSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, &env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Integers must parse and lie within range. Invalid values are ignored with
/// a warning (file/default value is kept).
pub fn apply_env_overrides<F>(settings: &mut WhisperSettings, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    let vars = EnvReader { env };

    // ── API ─────────────────────────────────────────────────────────
    if let Some(v) = vars.string("OPENAI_API_KEY") {
        settings.api.api_key = Some(v);
    }
    if let Some(v) = vars.string("OPENAI_BASE_URL") {
        settings.api.base_url = v.trim_end_matches('/').to_string();
    }
    if let Some(v) = vars.u64("WHISPER_REQUEST_TIMEOUT_MS", 1000, 3_600_000) {
        settings.api.request_timeout_ms = v;
    }
    if let Some(v) = vars.u64("WHISPER_MAX_RETRIES", 0, 10) {
        settings.retry.max_retries = v as u32;
    }

    // ── Files ───────────────────────────────────────────────────────
    if let Some(v) = vars.string("AUDIO_FILES_PATH") {
        settings.files.base_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = vars.string("WHISPER_OUTPUT_DIR") {
        settings.files.output_dir = Some(PathBuf::from(v));
    }

    // ── Chunking ────────────────────────────────────────────────────
    if let Some(v) = vars.u64("WHISPER_SIZE_CEILING_BYTES", 1024, 1_073_741_824) {
        settings.chunking.size_ceiling_bytes = v;
    }
    if let Some(v) = vars.usize("WHISPER_MAX_PARALLEL_CHUNKS", 1, 64) {
        settings.chunking.max_parallel_chunks = v;
    }

    // ── Codec / logging ─────────────────────────────────────────────
    if let Some(v) = vars.string("WHISPER_FFMPEG_PATH") {
        settings.codec.ffmpeg_path = v;
    }
    if let Some(v) = vars.string("WHISPER_FFPROBE_PATH") {
        settings.codec.ffprobe_path = v;
    }
    if let Some(v) = vars.string("WHISPER_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

struct EnvReader<'a, F> {
    env: &'a F,
}

impl<F> EnvReader<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.env)(name).filter(|v| !v.trim().is_empty())
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = (self.env)(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    }

    fn usize(&self, name: &str, min: usize, max: usize) -> Option<usize> {
        let val = (self.env)(name)?;
        let result = parse_usize_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid usize env var, ignoring");
        }
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
