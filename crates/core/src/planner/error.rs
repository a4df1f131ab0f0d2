//! Error types for the planner module.

use thiserror::Error;

use crate::capabilities::CapabilityError;

/// Errors that make a source unplannable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The platform needs the legacy capability checks and one failed.
    #[error("platform encoder is unsupported: {0}")]
    UnsupportedPlatformEncoder(#[from] CapabilityError),
}
