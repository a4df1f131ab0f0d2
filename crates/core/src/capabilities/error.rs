//! Error types for the capabilities module.

use thiserror::Error;

/// Reasons the platform cannot provide a usable encoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// No encoder advertises the mime type.
    #[error("no codec info for {mime_type}")]
    NoCodec { mime_type: String },

    /// The selected encoder is known to be broken for this mime type.
    #[error("unsupported encoder = {name}")]
    Blacklisted { name: String },

    /// The selected encoder has no input color format we can fill.
    #[error("no color format for {mime_type} on {codec}")]
    NoColorFormat { codec: String, mime_type: String },

    /// The platform codec list could not be read.
    #[error("failed to enumerate codecs: {reason}")]
    EnumerationFailed { reason: String },
}

impl CapabilityError {
    /// Creates a new enumeration failed error.
    pub fn enumeration_failed(reason: impl Into<String>) -> Self {
        Self::EnumerationFailed {
            reason: reason.into(),
        }
    }
}
