//! Configuration for the compression planner.

use serde::{Deserialize, Serialize};

/// Configuration for the compression planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Compression tier to aim for (0 = smallest output).
    /// Unset selects the highest tier the source allows.
    #[serde(default)]
    pub quality_tier: Option<usize>,

    /// Framerate used when the source does not report one.
    #[serde(default = "default_framerate")]
    pub default_framerate: u32,
}

fn default_framerate() -> u32 {
    25
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            quality_tier: None,
            default_framerate: default_framerate(),
        }
    }
}

impl PlannerConfig {
    /// Sets the quality tier.
    pub fn with_quality_tier(mut self, tier: usize) -> Self {
        self.quality_tier = Some(tier);
        self
    }
}
