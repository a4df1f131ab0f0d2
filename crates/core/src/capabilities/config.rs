//! Platform configuration for capability gating.

use serde::{Deserialize, Serialize};

use super::types::CodecInfo;

/// Describes the platform the conversion runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Platform API level. Unset means "modern", which skips the legacy gate.
    #[serde(default)]
    pub api_level: Option<u32>,

    /// Below this level the encoder and color format must be verified
    /// before any compression is planned.
    #[serde(default = "default_min_capable_api_level")]
    pub min_capable_api_level: u32,

    /// Mime type of the output video track.
    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// Fixed codec list. When empty the list is detected at runtime.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub codecs: Vec<CodecInfo>,
}

fn default_min_capable_api_level() -> u32 {
    18
}

fn default_mime_type() -> String {
    "video/avc".to_string()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_level: None,
            min_capable_api_level: default_min_capable_api_level(),
            mime_type: default_mime_type(),
            codecs: Vec::new(),
        }
    }
}
