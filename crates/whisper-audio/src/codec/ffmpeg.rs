//! `ffmpeg`/`ffprobe` subprocess backend.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};
use whisper_core::AudioFormat;
use whisper_settings::CodecSettings;

use super::{AudioCodec, EncodeOptions, probe_duration_native};
use crate::errors::AudioError;

/// Keep at most this much stderr in error messages.
const STDERR_TAIL: usize = 400;

/// Production codec backed by the `ffmpeg` and `ffprobe` executables.
///
/// Duration probing tries symphonia first and only spawns `ffprobe` when the
/// container headers do not carry a frame count.
#[derive(Clone, Debug)]
pub struct FfmpegCodec {
    ffmpeg: String,
    ffprobe: String,
    timeout: Duration,
}

impl FfmpegCodec {
    /// Build from codec settings.
    pub fn new(settings: &CodecSettings) -> Self {
        Self {
            ffmpeg: settings.ffmpeg_path.clone(),
            ffprobe: settings.ffprobe_path.clone(),
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }

    async fn run(&self, program: &str, args: Vec<OsString>) -> Result<String, AudioError> {
        let start = Instant::now();

        let mut cmd = tokio::process::Command::new(program);
        let _ = cmd
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program, ?args, "spawning codec process");

        let child = cmd.spawn().map_err(|e| AudioError::Codec {
            message: format!("failed to spawn {program}: {e}"),
        })?;

        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let output = tokio::select! {
            result = child.wait_with_output() => {
                result.map_err(|e| AudioError::Codec {
                    message: format!("{program} wait failed: {e}"),
                })?
            }
            () = tokio::time::sleep(self.timeout) => {
                warn!(program, timeout_ms, "codec process timed out");
                return Err(AudioError::Timeout { timeout_ms });
            }
        };

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let exit_code = output.status.code().unwrap_or(-1);
        debug!(program, exit_code, duration_ms, "codec process completed");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::Codec {
                message: format!("{program} exited with code {exit_code}: {}", tail(stderr.trim())),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn ffprobe_duration(&self, path: &Path) -> Result<f64, AudioError> {
        let args = vec![
            "-v".into(),
            "error".into(),
            "-show_entries".into(),
            "format=duration".into(),
            "-of".into(),
            "default=noprint_wrappers=1:nokey=1".into(),
            path.as_os_str().to_owned(),
        ];
        let stdout = self.run(&self.ffprobe, args).await?;
        parse_probe_output(&stdout).ok_or_else(|| AudioError::DurationUnknown {
            path: path.to_path_buf(),
        })
    }
}

#[async_trait]
impl AudioCodec for FfmpegCodec {
    async fn probe_duration(&self, path: &Path) -> Result<f64, AudioError> {
        let owned = path.to_path_buf();
        let native = tokio::task::spawn_blocking(move || probe_duration_native(&owned))
            .await
            .ok()
            .flatten();
        if let Some(secs) = native {
            return Ok(secs);
        }
        debug!(path = %path.display(), "native probe failed, falling back to ffprobe");
        self.ffprobe_duration(path).await
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        options: &EncodeOptions,
    ) -> Result<(), AudioError> {
        let mut args = base_args(input);
        args.push("-vn".into());
        args.push("-acodec".into());
        args.push(encoder_for(options.format).into());
        if let Some(rate) = options.sample_rate_hz {
            args.push("-ar".into());
            args.push(rate.to_string().into());
        }
        if let Some(kbps) = options.bitrate_kbps {
            args.push("-b:a".into());
            args.push(format!("{kbps}k").into());
        }
        args.push("-f".into());
        args.push(muxer_for(options.format).into());
        args.push(output.as_os_str().to_owned());

        let _ = self.run(&self.ffmpeg, args).await?;
        Ok(())
    }

    async fn extract_segment(
        &self,
        input: &Path,
        output: &Path,
        start_secs: f64,
        end_secs: f64,
    ) -> Result<(), AudioError> {
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-ss".into(),
            format!("{start_secs:.3}").into(),
            "-t".into(),
            format!("{:.3}", (end_secs - start_secs).max(0.0)).into(),
            "-i".into(),
            input.as_os_str().to_owned(),
        ];
        for arg in ["-vn", "-c", "copy"] {
            args.push(arg.into());
        }
        args.push(output.as_os_str().to_owned());

        let _ = self.run(&self.ffmpeg, args).await?;
        Ok(())
    }
}

fn base_args(input: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input.as_os_str().to_owned(),
    ]
}

fn encoder_for(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Mp3 | AudioFormat::Mpeg | AudioFormat::Mpga => "libmp3lame",
        AudioFormat::Wav => "pcm_s16le",
        AudioFormat::Flac => "flac",
        AudioFormat::Mp4 | AudioFormat::M4a => "aac",
        AudioFormat::Ogg => "libvorbis",
    }
}

fn muxer_for(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Mp3 | AudioFormat::Mpeg | AudioFormat::Mpga => "mp3",
        AudioFormat::Wav => "wav",
        AudioFormat::Flac => "flac",
        AudioFormat::Mp4 | AudioFormat::M4a => "mp4",
        AudioFormat::Ogg => "ogg",
    }
}

fn parse_probe_output(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find_map(|l| l.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

fn tail(s: &str) -> &str {
    if s.len() <= STDERR_TAIL {
        return s;
    }
    let mut start = s.len() - STDERR_TAIL;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
