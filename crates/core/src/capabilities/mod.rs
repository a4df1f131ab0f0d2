//! Encoder capability selection.
//!
//! Picks a platform video encoder and an input color format for it, working
//! around OEM encoders that advertise support they do not deliver. On
//! platforms below the minimum capable API level these checks gate the whole
//! plan: if any of them fails, no conversion may start.
//!
//! # Example
//!
//! ```ignore
//! use squeezer_core::capabilities::{FfmpegCodecCatalog, LegacyGate, PlatformConfig};
//!
//! let catalog = FfmpegCodecCatalog::detect(&encoder_config).await?;
//! let gate = LegacyGate::from_config(&PlatformConfig::default());
//! if let Some(choice) = gate.check(&catalog)? {
//!     println!("{} with color format {}", choice.codec_name, choice.color_format);
//! }
//! ```

mod catalog;
mod config;
mod error;
mod ffmpeg;
mod selector;
mod types;

pub use catalog::{CodecCatalog, StaticCodecCatalog};
pub use config::PlatformConfig;
pub use error::CapabilityError;
pub use ffmpeg::FfmpegCodecCatalog;
pub use selector::{
    is_blacklisted, select_codec, select_color_format, LegacyGate, BUGGY_SEC_ENCODER,
    PAIRED_SEC_ENCODER, UNSUPPORTED_ENCODERS,
};
pub use types::{CodecInfo, ColorFormat, EncoderChoice};
