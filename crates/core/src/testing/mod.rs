//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the collaborator traits,
//! allowing the orchestrator and planner to be tested without ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use squeezer_core::testing::{fixtures, MockEncoder, MockProbe};
//! use squeezer_core::state::MemoryFlagStore;
//!
//! let encoder = MockEncoder::new().with_progress(vec![(1024, 0.5)]);
//! let probe = MockProbe::new();
//! probe.set_default_report(fixtures::report_1080p()).await;
//!
//! // Use with ConversionOrchestrator...
//! ```

mod mock_encoder;
mod mock_probe;

pub use crate::state::MemoryFlagStore;
pub use mock_encoder::MockEncoder;
pub use mock_probe::MockProbe;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use crate::capabilities::CodecInfo;
    use crate::planner::{CompressionPlan, CompressionPlanner, EditDescriptors};
    use crate::probe::{ProbeReport, SourceMetadata};

    /// Probe report of a one minute 1080p landscape clip at 8 Mbps.
    pub fn report_1080p() -> ProbeReport {
        ProbeReport {
            bitrate_bps: 8_000_000,
            duration_secs: 60.0,
            framerate: 30,
            width: 1920,
            height: 1080,
            rotation: 0,
        }
    }

    /// Probe report of a 640x480 clip at 500 kbps.
    pub fn report_480p() -> ProbeReport {
        ProbeReport {
            bitrate_bps: 500_000,
            duration_secs: 12.5,
            framerate: 25,
            width: 640,
            height: 480,
            rotation: 0,
        }
    }

    /// Source metadata for [`report_1080p`].
    pub fn source_1080p() -> SourceMetadata {
        SourceMetadata::from_report(PathBuf::from("/videos/clip_1080p.mp4"), &report_1080p())
    }

    /// Source metadata for [`report_480p`].
    pub fn source_480p() -> SourceMetadata {
        SourceMetadata::from_report(PathBuf::from("/videos/clip_480p.mp4"), &report_480p())
    }

    /// Default plan for [`source_1080p`]: 1280x720 at 3.2 Mbps.
    pub fn plan_1080p() -> CompressionPlan {
        CompressionPlanner::with_defaults().plan(&source_1080p(), &EditDescriptors::default())
    }

    /// An AVC encoder entry with the given color formats.
    pub fn avc_encoder(name: &str, color_formats: &[i32]) -> CodecInfo {
        CodecInfo::encoder(name, "video/avc").with_color_formats(color_formats.iter().copied())
    }
}
