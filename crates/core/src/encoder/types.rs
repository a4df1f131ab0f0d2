//! Types for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::planner::{CompressionPlan, EditDescriptors};

/// Everything the encoder needs to produce the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeRequest {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub rotation: u32,
    /// Output frame width as the encoder sees it (rotation applied).
    pub target_width: u32,
    /// Output frame height as the encoder sees it (rotation applied).
    pub target_height: u32,
    pub framerate: u32,
    pub target_bitrate_bps: i64,
    pub original_bitrate_bps: i64,
    /// `-1` when unset.
    pub trim_start_ms: i64,
    /// `-1` when unset.
    pub trim_end_ms: i64,
    /// `-1` when unset.
    pub avatar_start_ms: i64,
    pub needs_compress: bool,
    pub duration_ms: i64,
    pub edits: EditDescriptors,
}

impl EncodeRequest {
    /// Builds the request for a planned conversion.
    pub fn from_plan(
        source_path: &Path,
        output_path: &Path,
        plan: &CompressionPlan,
        edits: &EditDescriptors,
    ) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            rotation: plan.rotation,
            target_width: plan.encoder_width,
            target_height: plan.encoder_height,
            framerate: plan.framerate,
            target_bitrate_bps: plan.target_bitrate_bps,
            original_bitrate_bps: plan.original_bitrate_bps,
            trim_start_ms: plan.trim_start_ms,
            trim_end_ms: plan.trim_end_ms,
            avatar_start_ms: plan.avatar_start_ms,
            needs_compress: plan.needs_reencode,
            duration_ms: plan.duration_ms,
            edits: *edits,
        }
    }

    /// Progress fraction for an output timestamp.
    pub fn fraction_at(&self, timestamp_us: i64) -> f32 {
        if self.duration_ms <= 0 {
            return 0.0;
        }
        (timestamp_us as f64 / (self.duration_ms as f64 * 1000.0)).clamp(0.0, 1.0) as f32
    }
}

/// Result of a successful encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOutcome {
    /// Presentation timestamp of the last frame written, in microseconds.
    pub last_frame_timestamp_us: i64,
}
