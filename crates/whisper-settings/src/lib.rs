//! # whisper-settings
//!
//! Layered configuration for the whisper tool server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`WhisperSettings::default()`]
//! 2. **Settings file**: `~/.whisper-mcp/settings.json` or an explicit path
//!    (deep-merged over defaults)
//! 3. **Environment variables**: `OPENAI_*`, `AUDIO_FILES_PATH`, and
//!    `WHISPER_*` overrides (highest priority)
//!
//! There is no global instance: the binary loads settings once and hands
//! them to the components it builds.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_settings, load_settings_from_path,
    load_settings_with_env, settings_path,
};
pub use types::*;
