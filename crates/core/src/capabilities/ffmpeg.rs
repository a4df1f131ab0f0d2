//! Encoder enumeration through the ffmpeg binary.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::catalog::{CodecCatalog, StaticCodecCatalog};
use super::error::CapabilityError;
use super::types::{CodecInfo, ColorFormat};
use crate::encoder::EncoderConfig;

/// Video encoder line of `ffmpeg -encoders`, e.g.
/// ` V....D h264_nvenc           NVIDIA NVENC H.264 encoder (codec h264)`.
static ENCODER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*V[A-Z.]{5}\s+(\S+)\s+(.*)$").expect("valid encoder line regex")
});

static CODEC_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(codec (\w+)\)").expect("valid codec suffix regex"));

/// Codec list detected from the local ffmpeg build.
///
/// ffmpeg encoders are mapped onto platform-style entries: the codec id gives
/// the mime type and the supported pixel formats give the color formats.
pub struct FfmpegCodecCatalog {
    inner: StaticCodecCatalog,
}

impl FfmpegCodecCatalog {
    /// Detect available encoders by probing ffmpeg.
    pub async fn detect(config: &EncoderConfig) -> Result<Self, CapabilityError> {
        let output = Command::new(&config.ffmpeg_path)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| CapabilityError::enumeration_failed(e.to_string()))?;

        if !output.status.success() {
            return Err(CapabilityError::enumeration_failed(format!(
                "ffmpeg -encoders exited with code: {:?}",
                output.status.code()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut codecs = Self::parse_encoder_list(&stdout);

        for codec in &mut codecs {
            codec.color_formats = Self::query_color_formats(config, &codec.name).await;
        }

        debug!("Detected {} video encoders", codecs.len());
        Ok(Self {
            inner: StaticCodecCatalog::new(codecs),
        })
    }

    /// Parses `ffmpeg -encoders` output into codec entries without color formats.
    pub(crate) fn parse_encoder_list(output: &str) -> Vec<CodecInfo> {
        output
            .lines()
            .filter_map(|line| {
                let caps = ENCODER_LINE.captures(line)?;
                let name = caps.get(1)?.as_str();
                let description = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                let codec_id = CODEC_SUFFIX
                    .captures(description)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str())
                    .unwrap_or(name);
                let mime_type = mime_for_codec_id(codec_id)?;
                Some(CodecInfo::encoder(name, mime_type))
            })
            .collect()
    }

    /// Parses the "Supported pixel formats" line of `ffmpeg -h encoder=<name>`.
    pub(crate) fn parse_pixel_formats(output: &str) -> Vec<ColorFormat> {
        output
            .lines()
            .find_map(|line| line.trim().strip_prefix("Supported pixel formats:"))
            .map(|formats| {
                formats
                    .split_whitespace()
                    .filter_map(ColorFormat::from_pix_fmt)
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn query_color_formats(config: &EncoderConfig, name: &str) -> Vec<ColorFormat> {
        let output = Command::new(&config.ffmpeg_path)
            .args(["-hide_banner", "-h"])
            .arg(format!("encoder={}", name))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await;

        match output {
            Ok(o) if o.status.success() => {
                Self::parse_pixel_formats(&String::from_utf8_lossy(&o.stdout))
            }
            _ => Vec::new(),
        }
    }
}

impl CodecCatalog for FfmpegCodecCatalog {
    fn codecs(&self) -> Result<Vec<CodecInfo>, CapabilityError> {
        self.inner.codecs()
    }
}

fn mime_for_codec_id(codec_id: &str) -> Option<&'static str> {
    match codec_id {
        "h264" => Some("video/avc"),
        "hevc" => Some("video/hevc"),
        "vp9" => Some("video/x-vnd.on2.vp9"),
        "av1" => Some("video/av01"),
        _ => None,
    }
}
