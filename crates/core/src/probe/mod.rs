//! Source metadata extraction.
//!
//! The core only needs duration, dimensions, rotation, framerate and bitrate
//! of the source file. Those come from a [`MetadataProbe`]; the probe never
//! fails as a whole, a field it cannot read is reported as zero.
//!
//! # Example
//!
//! ```ignore
//! use squeezer_core::probe::{FfprobeProbe, MetadataProbe, SourceMetadata};
//!
//! let probe = FfprobeProbe::with_defaults();
//! let report = probe.probe(Path::new("/path/to/clip.mp4")).await;
//! let source = SourceMetadata::from_report("/path/to/clip.mp4", &report);
//! println!("{}x{} @ {} bps", source.original_width, source.original_height, source.original_bitrate_bps);
//! ```

mod ffprobe;
mod traits;
mod types;

pub use ffprobe::FfprobeProbe;
pub use traits::MetadataProbe;
pub use types::{ProbeReport, SourceMetadata};
