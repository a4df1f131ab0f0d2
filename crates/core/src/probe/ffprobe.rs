//! FFprobe-based metadata probe.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

use super::traits::MetadataProbe;
use super::types::ProbeReport;
use crate::encoder::EncoderConfig;

// Leaf values stay untyped so one malformed field cannot void the others.

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: Option<Value>,
    #[serde(default)]
    streams: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    duration: Option<Value>,
    bit_rate: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    codec_type: Option<Value>,
    width: Option<Value>,
    height: Option<Value>,
    bit_rate: Option<Value>,
    r_frame_rate: Option<Value>,
    avg_frame_rate: Option<Value>,
    tags: Option<Value>,
    side_data_list: Option<Value>,
}

impl ProbeStream {
    fn is_video(&self) -> bool {
        self.codec_type.as_ref().and_then(Value::as_str) == Some("video")
    }
}

/// Reads a number that ffprobe may print either as a JSON number or a string.
fn value_f64(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn value_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

fn value_u32(value: Option<&Value>) -> Option<u32> {
    value_i64(value).and_then(|v| u32::try_from(v).ok())
}

/// Metadata probe backed by the `ffprobe` binary.
pub struct FfprobeProbe {
    ffprobe_path: PathBuf,
}

impl FfprobeProbe {
    /// Creates a probe that runs the given ffprobe binary.
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }

    /// Creates a probe using `ffprobe` from `PATH`.
    pub fn with_defaults() -> Self {
        Self::new(PathBuf::from("ffprobe"))
    }

    /// Creates a probe from the encoder configuration.
    pub fn from_config(config: &EncoderConfig) -> Self {
        Self::new(config.ffprobe_path.clone())
    }

    /// Parses ffprobe JSON output into a report.
    ///
    /// Each field is read on its own; a missing or malformed value leaves that
    /// field at zero.
    pub(crate) fn parse_probe_output(path: &Path, output: &str) -> ProbeReport {
        let probe: ProbeOutput = match serde_json::from_str(output) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to parse ffprobe output for {:?}: {}", path, e);
                return ProbeReport::default();
            }
        };

        let format: ProbeFormat = probe
            .format
            .and_then(|f| serde_json::from_value(f).ok())
            .unwrap_or_default();
        let video = probe
            .streams
            .into_iter()
            .filter_map(|s| serde_json::from_value::<ProbeStream>(s).ok())
            .find(ProbeStream::is_video);

        let duration_secs = value_f64(format.duration.as_ref())
            .filter(|d| *d > 0.0)
            .unwrap_or_else(|| {
                warn!("No usable duration for {:?}", path);
                0.0
            });

        // Container bitrate first, the video stream's own bitrate as fallback
        let bitrate_bps = value_i64(format.bit_rate.as_ref())
            .or_else(|| video.as_ref().and_then(|s| value_i64(s.bit_rate.as_ref())))
            .unwrap_or_else(|| {
                warn!("No usable bitrate for {:?}", path);
                0
            });

        let Some(video) = video else {
            warn!("No video stream found in {:?}", path);
            return ProbeReport {
                bitrate_bps,
                duration_secs,
                ..Default::default()
            };
        };

        let framerate = video
            .r_frame_rate
            .as_ref()
            .and_then(Value::as_str)
            .and_then(parse_frame_rate)
            .or_else(|| {
                video
                    .avg_frame_rate
                    .as_ref()
                    .and_then(Value::as_str)
                    .and_then(parse_frame_rate)
            })
            .map(|fps| fps.round() as u32)
            .unwrap_or(0);

        ProbeReport {
            bitrate_bps,
            duration_secs,
            framerate,
            width: value_u32(video.width.as_ref()).unwrap_or(0),
            height: value_u32(video.height.as_ref()).unwrap_or(0),
            rotation: parse_rotation(&video),
        }
    }
}

/// Parses a frame rate like "30000/1001" or "25".
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let fps = match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().ok()?;
            let den = den.parse::<f64>().ok()?;
            if den > 0.0 {
                num / den
            } else {
                return None;
            }
        }
        None => rate.parse::<f64>().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Rotation from the legacy `rotate` tag, or the display matrix side data.
///
/// The display matrix stores the counter-clockwise angle, so it is negated to
/// match the clockwise `rotate` tag convention.
fn parse_rotation(stream: &ProbeStream) -> i32 {
    let tag = stream
        .tags
        .as_ref()
        .and_then(|tags| value_i64(tags.get("rotate")));
    if let Some(rotate) = tag {
        return (rotate.rem_euclid(360)) as i32;
    }

    stream
        .side_data_list
        .as_ref()
        .and_then(Value::as_array)
        .and_then(|list| list.iter().find_map(|sd| value_f64(sd.get("rotation"))))
        .map(|r| (-(r.round() as i64)).rem_euclid(360) as i32)
        .unwrap_or(0)
}

#[async_trait]
impl MetadataProbe for FfprobeProbe {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> ProbeReport {
        if !path.exists() {
            warn!("Cannot probe missing file {:?}", path);
            return ProbeReport::default();
        }

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await;

        let output = match output {
            Ok(o) if o.status.success() => o,
            Ok(o) => {
                warn!(
                    "ffprobe failed for {:?}: {}",
                    path,
                    String::from_utf8_lossy(&o.stderr)
                );
                return ProbeReport::default();
            }
            Err(e) => {
                warn!("Failed to run {:?}: {}", self.ffprobe_path, e);
                return ProbeReport::default();
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = Self::parse_probe_output(path, &stdout);
        debug!("Probed {:?}: {:?}", path, report);
        report
    }
}
