//! Codec enumeration.

use super::error::CapabilityError;
use super::types::CodecInfo;

/// Source of the platform's codec list.
pub trait CodecCatalog: Send + Sync {
    /// Returns all codecs in platform enumeration order.
    fn codecs(&self) -> Result<Vec<CodecInfo>, CapabilityError>;
}

/// A fixed codec list, from configuration or a previous detection.
#[derive(Debug, Clone, Default)]
pub struct StaticCodecCatalog {
    codecs: Vec<CodecInfo>,
}

impl StaticCodecCatalog {
    pub fn new(codecs: Vec<CodecInfo>) -> Self {
        Self { codecs }
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl CodecCatalog for StaticCodecCatalog {
    fn codecs(&self) -> Result<Vec<CodecInfo>, CapabilityError> {
        Ok(self.codecs.clone())
    }
}
