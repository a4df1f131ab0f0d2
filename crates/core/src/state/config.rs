//! Configuration for the state module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where persisted state lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory holding the flag file.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

fn default_dir() -> PathBuf {
    std::env::temp_dir().join("squeezer")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}
