//! Trait definitions for the probe module.

use async_trait::async_trait;
use std::path::Path;

use super::types::ProbeReport;

/// Reads the metadata the planner needs from a media file.
///
/// Implementations must be safe to call repeatedly and concurrently; the core
/// does not cache results.
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    /// Returns the name of this probe implementation.
    fn name(&self) -> &str;

    /// Probes a file.
    ///
    /// Never fails as a whole: fields that cannot be read are zero and the
    /// failure is logged.
    async fn probe(&self, path: &Path) -> ProbeReport;
}
