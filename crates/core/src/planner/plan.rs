//! Compression planning.

use tracing::{debug, warn};

use super::bitrate::compute_bitrate;
use super::config::PlannerConfig;
use super::error::PlanError;
use super::types::{CompressionPlan, EditDescriptors};
use crate::capabilities::{CodecCatalog, LegacyGate};
use crate::probe::SourceMetadata;

/// Sources with a longer side above this are always compressed.
pub const MAX_UNCOMPRESSED_SIDE: u32 = 1280;

/// Number of compression tiers offered for a source whose longer side is `max_side`.
pub fn tier_count(max_side: u32) -> usize {
    if max_side > 1280 {
        4
    } else if max_side > 854 {
        3
    } else if max_side > 640 {
        2
    } else {
        1
    }
}

/// Longer side of the output for a compression tier.
pub fn tier_max_side(tier: usize) -> u32 {
    match tier {
        0 => 432,
        1 => 640,
        2 => 848,
        _ => 1280,
    }
}

/// Scales `dimension` by `target / max_side`, rounded to the nearest even number.
fn scale_to_even(dimension: u32, target: u32, max_side: u32) -> u32 {
    let pairs = (dimension as u64 * target as u64 + max_side as u64) / (2 * max_side as u64);
    (pairs * 2) as u32
}

/// Rounds an unscaled dimension down to even, keeping non-empty frames non-empty.
fn floor_to_even(dimension: u32) -> u32 {
    match dimension {
        0 => 0,
        1 => 2,
        d => d - d % 2,
    }
}

/// Output length of the job after trimming.
pub fn trimmed_duration_ms(original_duration_ms: i64, start_ms: i64, end_ms: i64) -> i64 {
    if start_ms > 0 && end_ms > 0 {
        end_ms - start_ms
    } else if end_ms > 0 {
        end_ms
    } else if start_ms > 0 {
        original_duration_ms - start_ms
    } else {
        original_duration_ms
    }
}

/// Derives output resolution, bitrate and framerate from source metadata.
///
/// Planning has no side effects and always gives the same plan for the same
/// source, edits and configuration.
#[derive(Debug, Clone, Default)]
pub struct CompressionPlanner {
    config: PlannerConfig,
}

impl CompressionPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Builds the compression plan for a source.
    pub fn plan(&self, source: &SourceMetadata, edits: &EditDescriptors) -> CompressionPlan {
        let original_width = source.original_width;
        let original_height = source.original_height;
        let max_side = source.max_side();

        let tier_count = tier_count(max_side);
        let last_tier = tier_count - 1;
        let selected_tier = self.config.quality_tier.unwrap_or(last_tier).min(last_tier);

        let resize = selected_tier != last_tier || max_side > MAX_UNCOMPRESSED_SIDE;
        let (result_width, result_height) = if resize && max_side > 0 {
            let target = tier_max_side(selected_tier);
            (
                scale_to_even(original_width, target, max_side),
                scale_to_even(original_height, target, max_side),
            )
        } else {
            (floor_to_even(original_width), floor_to_even(original_height))
        };

        let dimensions_changed =
            result_width != original_width || result_height != original_height;
        let needs_reencode = resize
            || dimensions_changed
            || source.rotation != 0
            || edits.requires_reencode();

        let (encoder_width, encoder_height) = if source.rotation == 90 || source.rotation == 270 {
            (result_height, result_width)
        } else {
            (result_width, result_height)
        };

        // A stream that is not re-encoded keeps its bitrate.
        let target_bitrate_bps = if needs_reencode {
            compute_bitrate(
                original_height,
                original_width,
                source.original_bitrate_bps,
                result_height,
                result_width,
            )
        } else {
            source.original_bitrate_bps
        };

        let framerate = if source.framerate == 0 {
            self.config.default_framerate
        } else {
            source.framerate
        };

        let plan = CompressionPlan {
            original_width,
            original_height,
            result_width,
            result_height,
            encoder_width,
            encoder_height,
            rotation: source.rotation,
            target_bitrate_bps,
            original_bitrate_bps: source.original_bitrate_bps,
            framerate,
            needs_reencode,
            duration_ms: trimmed_duration_ms(
                source.original_duration_ms,
                edits.trim_start_ms,
                edits.trim_end_ms,
            ),
            trim_start_ms: edits.trim_start_ms,
            trim_end_ms: edits.trim_end_ms,
            avatar_start_ms: edits.avatar_start_ms,
            tier_count,
            selected_tier,
        };

        debug!(
            "Planned {:?}: {}x{} -> {}x{} @ {} bps, reencode={}",
            source.path,
            original_width,
            original_height,
            plan.result_width,
            plan.result_height,
            plan.target_bitrate_bps,
            plan.needs_reencode
        );

        plan
    }

    /// Builds the plan after the legacy capability gate has passed.
    ///
    /// On platforms that need the gate, any failed check makes the source
    /// unplannable and the caller must not start a conversion.
    pub fn plan_gated(
        &self,
        source: &SourceMetadata,
        edits: &EditDescriptors,
        gate: &LegacyGate,
        catalog: &dyn CodecCatalog,
    ) -> Result<CompressionPlan, PlanError> {
        if let Err(e) = gate.check(catalog) {
            warn!("Cannot plan {:?}: {}", source.path, e);
            return Err(PlanError::UnsupportedPlatformEncoder(e));
        }
        Ok(self.plan(source, edits))
    }
}
