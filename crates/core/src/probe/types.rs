//! Types for the probe module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Raw probe output.
///
/// Every field is independent: a value the probe could not read is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Container or stream bitrate in bits per second.
    pub bitrate_bps: i64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Frames per second, rounded to an integer.
    pub framerate: u32,
    /// Coded width in pixels.
    pub width: u32,
    /// Coded height in pixels.
    pub height: u32,
    /// Display rotation in degrees.
    pub rotation: i32,
}

impl ProbeReport {
    /// Whether the probe could not read anything structural about the file.
    pub fn is_empty(&self) -> bool {
        self.width == 0 && self.height == 0 && self.duration_secs == 0.0
    }
}

/// Immutable description of the source file a job is planned for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub path: PathBuf,
    pub original_width: u32,
    pub original_height: u32,
    /// One of 0, 90, 180, 270.
    pub rotation: u32,
    pub original_duration_ms: i64,
    pub original_bitrate_bps: i64,
    pub framerate: u32,
}

impl SourceMetadata {
    /// Builds source metadata from a probe report.
    ///
    /// Rotations other than the four right angles are treated as 0.
    pub fn from_report(path: impl AsRef<Path>, report: &ProbeReport) -> Self {
        let rotation = normalize_rotation(report.rotation).unwrap_or_else(|| {
            warn!(
                "Ignoring unsupported rotation {} for {:?}",
                report.rotation,
                path.as_ref()
            );
            0
        });

        Self {
            path: path.as_ref().to_path_buf(),
            original_width: report.width,
            original_height: report.height,
            rotation,
            original_duration_ms: (report.duration_secs.max(0.0) * 1000.0) as i64,
            original_bitrate_bps: report.bitrate_bps.max(0),
            framerate: report.framerate,
        }
    }

    /// Longest side of the source frame.
    pub fn max_side(&self) -> u32 {
        self.original_width.max(self.original_height)
    }
}

/// Maps any multiple of 90 (including negative values) into 0..360.
pub(crate) fn normalize_rotation(degrees: i32) -> Option<u32> {
    let normalized = degrees.rem_euclid(360);
    match normalized {
        0 | 90 | 180 | 270 => Some(normalized as u32),
        _ => None,
    }
}
