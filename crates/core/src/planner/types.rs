//! Types for the planner module.

use serde::{Deserialize, Serialize};

/// Edits requested by the editing front end.
///
/// The planner only cares whether an edit is present; each one forces a
/// re-encode. Millisecond fields use `-1` for "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDescriptors {
    #[serde(default)]
    pub has_crop: bool,
    #[serde(default)]
    pub has_filters: bool,
    #[serde(default)]
    pub has_paint_overlay: bool,
    #[serde(default)]
    pub has_media_entities: bool,
    #[serde(default)]
    pub is_round_video: bool,
    #[serde(default = "unset")]
    pub avatar_start_ms: i64,
    #[serde(default = "unset")]
    pub trim_start_ms: i64,
    #[serde(default = "unset")]
    pub trim_end_ms: i64,
}

fn unset() -> i64 {
    -1
}

impl Default for EditDescriptors {
    fn default() -> Self {
        Self {
            has_crop: false,
            has_filters: false,
            has_paint_overlay: false,
            has_media_entities: false,
            is_round_video: false,
            avatar_start_ms: unset(),
            trim_start_ms: unset(),
            trim_end_ms: unset(),
        }
    }
}

impl EditDescriptors {
    /// Whether any edit on its own requires the frames to be re-encoded.
    ///
    /// Dimension and rotation changes are decided by the planner, not here.
    pub fn requires_reencode(&self) -> bool {
        self.has_crop
            || self.has_filters
            || self.has_paint_overlay
            || self.has_media_entities
            || self.is_round_video
            || self.avatar_start_ms != -1
            || self.trim_start_ms != -1
    }

    /// Sets the trim window, `-1` for an open end.
    pub fn with_trim(mut self, start_ms: i64, end_ms: i64) -> Self {
        self.trim_start_ms = start_ms;
        self.trim_end_ms = end_ms;
        self
    }
}

/// The planner's output: everything the encoder needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionPlan {
    pub original_width: u32,
    pub original_height: u32,
    /// UI-facing output width (even).
    pub result_width: u32,
    /// UI-facing output height (even).
    pub result_height: u32,
    /// Width handed to the encoder; swapped with the height for 90/270 rotations.
    pub encoder_width: u32,
    /// Height handed to the encoder.
    pub encoder_height: u32,
    pub rotation: u32,
    pub target_bitrate_bps: i64,
    pub original_bitrate_bps: i64,
    pub framerate: u32,
    pub needs_reencode: bool,
    pub duration_ms: i64,
    pub trim_start_ms: i64,
    pub trim_end_ms: i64,
    pub avatar_start_ms: i64,
    /// Number of compression tiers available for this source.
    pub tier_count: usize,
    /// Tier the plan was built for (0 = smallest output).
    pub selected_tier: usize,
}

impl CompressionPlan {
    /// Whether the encoder-facing frame is rotated relative to the UI-facing one.
    pub fn is_swapped(&self) -> bool {
        self.rotation == 90 || self.rotation == 270
    }
}
