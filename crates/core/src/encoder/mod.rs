//! Encoder module for producing the compressed output.
//!
//! The [`Encoder`] trait is the narrow convert/cancel/progress interface the
//! orchestrator drives. [`FfmpegEncoder`] implements it on top of the ffmpeg
//! binary.
//!
//! # Example
//!
//! ```ignore
//! use squeezer_core::encoder::{EncodeRequest, Encoder, FfmpegEncoder};
//!
//! let encoder = FfmpegEncoder::with_defaults();
//! encoder.validate().await?;
//!
//! let request = EncodeRequest::from_plan(&source, &output, &plan, &edits);
//! let outcome = encoder.convert(request, callback).await?;
//! println!("last frame at {} us", outcome.last_frame_timestamp_us);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EncoderConfig;
pub use error::EncoderError;
pub use ffmpeg::FfmpegEncoder;
pub use traits::{ConversionCallback, Encoder};
pub use types::{EncodeOutcome, EncodeRequest};
