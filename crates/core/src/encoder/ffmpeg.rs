//! FFmpeg-based encoder implementation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::config::EncoderConfig;
use super::error::EncoderError;
use super::traits::{ConversionCallback, Encoder};
use super::types::{EncodeOutcome, EncodeRequest};

static OUT_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^out_time_us=(\d+)$").expect("valid out_time regex"));

fn format_secs(ms: i64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

/// FFmpeg-based encoder implementation.
///
/// ffmpeg applies the source rotation itself, so the request's target size
/// is the rotated (display) frame size.
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    /// Creates a new FFmpeg encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// Builds ffmpeg arguments for a request.
    fn build_args(&self, request: &EncodeRequest) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-nostdin".to_string()];

        if request.trim_start_ms > 0 {
            args.extend(["-ss".to_string(), format_secs(request.trim_start_ms)]);
        }

        args.extend([
            "-i".to_string(),
            request.source_path.to_string_lossy().to_string(),
        ]);

        if request.trim_end_ms > 0 && request.duration_ms > 0 {
            args.extend(["-t".to_string(), format_secs(request.duration_ms)]);
        }

        if request.needs_compress {
            args.extend([
                "-c:v".to_string(),
                self.config.video_codec.clone(),
                "-b:v".to_string(),
                request.target_bitrate_bps.to_string(),
                "-r".to_string(),
                request.framerate.to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
            ]);

            if request.target_width > 0 && request.target_height > 0 {
                args.extend([
                    "-vf".to_string(),
                    format!("scale={}:{}", request.target_width, request.target_height),
                ]);
            }

            args.extend(["-c:a".to_string(), self.config.audio_codec.clone()]);
        } else {
            args.extend(["-c".to_string(), "copy".to_string()]);
        }

        args.extend([
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            "-progress".to_string(),
            "pipe:2".to_string(),
        ]);

        args.extend(self.config.extra_args.iter().cloned());

        args.push(request.output_path.to_string_lossy().to_string());

        args
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn convert(
        &self,
        request: EncodeRequest,
        callback: Arc<dyn ConversionCallback>,
    ) -> Result<EncodeOutcome, EncoderError> {
        if !request.source_path.exists() {
            return Err(EncoderError::InputNotFound {
                path: request.source_path.clone(),
            });
        }
        if callback.is_canceled() {
            return Err(EncoderError::Cancelled);
        }

        let args = self.build_args(&request);
        debug!("Running {:?} {}", self.config.ffmpeg_path, args.join(" "));

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncoderError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    EncoderError::Io(e)
                }
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EncoderError::conversion_failed("stderr was not captured", None))?;
        let mut reader = BufReader::new(stderr).lines();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut error_output = String::new();
            let mut last_timestamp_us = 0i64;

            while let Some(line) = reader.next_line().await? {
                if callback.is_canceled() {
                    let _ = child.kill().await;
                    return Err(EncoderError::Cancelled);
                }

                if line.contains("Error") || line.contains("error") {
                    error_output.push_str(&line);
                    error_output.push('\n');
                }

                if let Some(caps) = OUT_TIME.captures(line.trim()) {
                    if let Some(us) = caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok()) {
                        last_timestamp_us = us;
                    }
                }

                // Each progress block ends with a "progress=" line
                if line.starts_with("progress=") {
                    // ffmpeg does not report the muxed size reliably; let the
                    // caller look at the file.
                    callback.on_progress(-1, request.fraction_at(last_timestamp_us));
                }
            }

            let status = child.wait().await?;
            Ok::<_, EncoderError>((status, error_output, last_timestamp_us))
        })
        .await;

        match result {
            Ok(Ok((status, error_output, last_timestamp_us))) => {
                if !status.success() {
                    return Err(EncoderError::conversion_failed(
                        format!("FFmpeg exited with code: {:?}", status.code()),
                        if error_output.is_empty() {
                            None
                        } else {
                            Some(error_output)
                        },
                    ));
                }
                info!(
                    "Encoded {:?} -> {:?}",
                    request.source_path, request.output_path
                );
                Ok(EncodeOutcome {
                    last_frame_timestamp_us: last_timestamp_us,
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                // Kill the process on timeout
                let _ = child.kill().await;
                Err(EncoderError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        }
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EncoderError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                })
            }
            Err(e) => Err(EncoderError::Io(e)),
        }
    }
}
