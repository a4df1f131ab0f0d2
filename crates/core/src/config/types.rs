use serde::{Deserialize, Serialize};

use crate::capabilities::PlatformConfig;
use crate::encoder::EncoderConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::planner::PlannerConfig;
use crate::state::StateConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub compression: PlannerConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
}
