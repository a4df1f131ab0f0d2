//! Compression planning.
//!
//! Turns probed [`SourceMetadata`](crate::probe::SourceMetadata) and the
//! requested [`EditDescriptors`] into a [`CompressionPlan`]: output
//! resolution, target bitrate, framerate and whether the frames have to be
//! re-encoded at all.
//!
//! # Example
//!
//! ```ignore
//! use squeezer_core::planner::{CompressionPlanner, EditDescriptors};
//!
//! let planner = CompressionPlanner::with_defaults();
//! let plan = planner.plan(&source, &EditDescriptors::default());
//! if plan.needs_reencode {
//!     println!("{}x{} @ {} bps", plan.result_width, plan.result_height, plan.target_bitrate_bps);
//! }
//! ```

mod bitrate;
mod config;
mod error;
mod plan;
mod types;

pub use bitrate::{compute_bitrate, QualityTier, QUALITY_TIERS, REFERENCE_AREA, REFERENCE_FLOOR_BPS};
pub use config::PlannerConfig;
pub use error::PlanError;
pub use plan::{
    tier_count, tier_max_side, trimmed_duration_ms, CompressionPlanner, MAX_UNCOMPRESSED_SIDE,
};
pub use types::{CompressionPlan, EditDescriptors};
