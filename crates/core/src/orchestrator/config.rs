//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the conversion orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Directory the output files are written to.
    /// Creating it is up to the caller.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Output file name prefix, followed by the unix time in milliseconds
    /// and a unique suffix.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Output file extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Forward every progress callback, even when the output size did not change.
    #[serde(default)]
    pub force_progress_updates: bool,

    /// Capacity of the event channel created by callers that use the config.
    /// Progress events that do not fit are dropped.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("squeezer").join("video")
}

fn default_file_prefix() -> String {
    "Video_Compressor_".to_string()
}

fn default_extension() -> String {
    "mp4".to_string()
}

fn default_event_buffer() -> usize {
    64
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            file_prefix: default_file_prefix(),
            extension: default_extension(),
            force_progress_updates: false,
            event_buffer: default_event_buffer(),
        }
    }
}

impl OrchestratorConfig {
    /// Sets the output directory.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Forwards every progress callback.
    pub fn with_forced_progress(mut self) -> Self {
        self.force_progress_updates = true;
        self
    }

    /// Output file name for a unix timestamp in milliseconds and a suffix
    /// that tells apart jobs started within the same millisecond.
    pub fn output_file_name(&self, unix_millis: i64, unique: &str) -> String {
        format!(
            "{}{}_{}.{}",
            self.file_prefix, unix_millis, unique, self.extension
        )
    }
}
