//! Types for the capabilities module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform color format identifier for encoder input buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorFormat(pub i32);

impl ColorFormat {
    pub const YUV420_PLANAR: ColorFormat = ColorFormat(19);
    pub const YUV420_PACKED_PLANAR: ColorFormat = ColorFormat(20);
    pub const YUV420_SEMI_PLANAR: ColorFormat = ColorFormat(21);
    pub const YUV420_PACKED_SEMI_PLANAR: ColorFormat = ColorFormat(39);
    pub const TI_YUV420_PACKED_SEMI_PLANAR: ColorFormat = ColorFormat(0x7F00_0100);

    /// Whether the frame pipeline knows how to fill buffers of this format.
    pub fn is_recognized(self) -> bool {
        matches!(
            self,
            Self::YUV420_PLANAR
                | Self::YUV420_PACKED_PLANAR
                | Self::YUV420_SEMI_PLANAR
                | Self::YUV420_PACKED_SEMI_PLANAR
                | Self::TI_YUV420_PACKED_SEMI_PLANAR
        )
    }

    /// Maps an ffmpeg pixel format name to the matching color format.
    pub fn from_pix_fmt(name: &str) -> Option<Self> {
        match name {
            "yuv420p" => Some(Self::YUV420_PLANAR),
            "nv12" => Some(Self::YUV420_SEMI_PLANAR),
            "nv21" => Some(Self::YUV420_PACKED_SEMI_PLANAR),
            _ => None,
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One codec as enumerated by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecInfo {
    pub name: String,
    #[serde(default = "default_is_encoder")]
    pub is_encoder: bool,
    /// Mime types the codec advertises, e.g. "video/avc".
    pub supported_types: Vec<String>,
    /// Input color formats, in the order the codec advertises them.
    #[serde(default)]
    pub color_formats: Vec<ColorFormat>,
}

fn default_is_encoder() -> bool {
    true
}

impl CodecInfo {
    /// Creates an encoder entry.
    pub fn encoder(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_encoder: true,
            supported_types: vec![mime_type.into()],
            color_formats: Vec::new(),
        }
    }

    /// Sets the advertised color formats.
    pub fn with_color_formats(mut self, formats: impl IntoIterator<Item = i32>) -> Self {
        self.color_formats = formats.into_iter().map(ColorFormat).collect();
        self
    }

    /// Whether the codec advertises the mime type (case-insensitive).
    pub fn supports(&self, mime_type: &str) -> bool {
        self.supported_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime_type))
    }
}

/// The encoder and input format the conversion should use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderChoice {
    pub codec_name: String,
    pub color_format: ColorFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_formats() {
        for id in [19, 20, 21, 39, 0x7F00_0100] {
            assert!(ColorFormat(id).is_recognized(), "{} should be recognized", id);
        }
        assert!(!ColorFormat(0x7F42_0888).is_recognized());
        assert!(!ColorFormat(0).is_recognized());
    }

    #[test]
    fn test_from_pix_fmt() {
        assert_eq!(ColorFormat::from_pix_fmt("yuv420p"), Some(ColorFormat(19)));
        assert_eq!(ColorFormat::from_pix_fmt("nv12"), Some(ColorFormat(21)));
        assert_eq!(ColorFormat::from_pix_fmt("p010le"), None);
    }

    #[test]
    fn test_supports_is_case_insensitive() {
        let codec = CodecInfo::encoder("OMX.qcom.video.encoder.avc", "video/AVC");
        assert!(codec.supports("video/avc"));
        assert!(!codec.supports("video/hevc"));
    }

    #[test]
    fn test_codec_info_deserialize_defaults() {
        let codec: CodecInfo =
            toml::from_str(r#"name = "c2.android.avc.encoder"
supported_types = ["video/avc"]
color_formats = [21, 19]"#)
                .unwrap();
        assert!(codec.is_encoder);
        assert_eq!(codec.color_formats, vec![ColorFormat(21), ColorFormat(19)]);
    }
}
