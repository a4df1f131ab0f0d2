//! Encoder and color format tie-break rules.

use tracing::{debug, warn};

use super::catalog::CodecCatalog;
use super::config::PlatformConfig;
use super::error::CapabilityError;
use super::types::{CodecInfo, ColorFormat, EncoderChoice};

/// Samsung encoder that produces corrupt output; skipped during selection.
pub const BUGGY_SEC_ENCODER: &str = "OMX.SEC.avc.enc";

/// Samsung encoder that works, except with planar YUV input.
pub const PAIRED_SEC_ENCODER: &str = "OMX.SEC.AVC.Encoder";

/// Encoders that cannot produce usable AVC output on legacy platforms.
pub const UNSUPPORTED_ENCODERS: [&str; 7] = [
    "OMX.google.h264.encoder",
    "OMX.ST.VFM.H264Enc",
    "OMX.Exynos.avc.enc",
    "OMX.MARVELL.VIDEO.HW.CODA7542ENCODER",
    "OMX.MARVELL.VIDEO.H264ENCODER",
    "OMX.k3.video.encoder.avc",
    "OMX.TI.DUCATI1.VIDEO.H264E",
];

/// Picks the encoder for `mime_type` from codecs in enumeration order.
///
/// Scanning stops at the first matching encoder unless it is
/// [`BUGGY_SEC_ENCODER`]; [`PAIRED_SEC_ENCODER`] is always taken as soon as it
/// is seen. When the buggy encoder is the only match there is no encoder.
pub fn select_codec<'a>(codecs: &'a [CodecInfo], mime_type: &str) -> Option<&'a CodecInfo> {
    for codec in codecs
        .iter()
        .filter(|c| c.is_encoder && c.supports(mime_type))
    {
        if codec.name == PAIRED_SEC_ENCODER {
            return Some(codec);
        }
        if codec.name != BUGGY_SEC_ENCODER {
            return Some(codec);
        }
        debug!("Skipping {} for {}", codec.name, mime_type);
    }
    None
}

/// Picks the input color format for `codec`.
///
/// Takes the first recognized format, except planar YUV on
/// [`PAIRED_SEC_ENCODER`], where scanning continues; if nothing else is
/// recognized the last recognized format is used anyway.
pub fn select_color_format(codec: &CodecInfo, mime_type: &str) -> Option<ColorFormat> {
    if !codec.supports(mime_type) {
        return None;
    }

    let mut last_recognized = None;
    for &format in codec.color_formats.iter().filter(|f| f.is_recognized()) {
        last_recognized = Some(format);
        if !(codec.name == PAIRED_SEC_ENCODER && format == ColorFormat::YUV420_PLANAR) {
            return Some(format);
        }
    }
    last_recognized
}

/// Whether the encoder is categorically unsupported on legacy platforms.
pub fn is_blacklisted(name: &str) -> bool {
    UNSUPPORTED_ENCODERS.contains(&name)
}

/// Capability checks that must pass before planning on old platforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyGate {
    api_level: Option<u32>,
    min_capable_api_level: u32,
    mime_type: String,
}

impl LegacyGate {
    pub fn new(api_level: Option<u32>, min_capable_api_level: u32, mime_type: impl Into<String>) -> Self {
        Self {
            api_level,
            min_capable_api_level,
            mime_type: mime_type.into(),
        }
    }

    pub fn from_config(config: &PlatformConfig) -> Self {
        Self::new(
            config.api_level,
            config.min_capable_api_level,
            config.mime_type.clone(),
        )
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Whether the running platform is below the minimum capable level.
    pub fn is_required(&self) -> bool {
        matches!(self.api_level, Some(level) if level < self.min_capable_api_level)
    }

    /// Runs the capability checks.
    ///
    /// Returns `Ok(None)` when the platform does not need them, the verified
    /// choice when it does and every check passes, and the first failing
    /// check otherwise.
    pub fn check(&self, catalog: &dyn CodecCatalog) -> Result<Option<EncoderChoice>, CapabilityError> {
        if !self.is_required() {
            return Ok(None);
        }

        let codecs = catalog.codecs().map_err(|e| {
            warn!("Codec enumeration failed: {}", e);
            e
        })?;

        let codec = select_codec(&codecs, &self.mime_type).ok_or_else(|| {
            CapabilityError::NoCodec {
                mime_type: self.mime_type.clone(),
            }
        })?;

        if is_blacklisted(&codec.name) {
            return Err(CapabilityError::Blacklisted {
                name: codec.name.clone(),
            });
        }

        let color_format = select_color_format(codec, &self.mime_type).ok_or_else(|| {
            CapabilityError::NoColorFormat {
                codec: codec.name.clone(),
                mime_type: self.mime_type.clone(),
            }
        })?;

        debug!(
            "Legacy gate passed with {} (color format {})",
            codec.name, color_format
        );

        Ok(Some(EncoderChoice {
            codec_name: codec.name.clone(),
            color_format,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::StaticCodecCatalog;

    const AVC: &str = "video/avc";

    struct FailingCatalog;

    impl CodecCatalog for FailingCatalog {
        fn codecs(&self) -> Result<Vec<CodecInfo>, CapabilityError> {
            Err(CapabilityError::enumeration_failed("codec list unavailable"))
        }
    }

    #[test]
    fn test_select_codec_first_match() {
        let codecs = vec![
            CodecInfo::encoder("OMX.qcom.video.encoder.hevc", "video/hevc"),
            CodecInfo::encoder("OMX.qcom.video.encoder.avc", AVC),
            CodecInfo::encoder("c2.android.avc.encoder", AVC),
        ];
        let codec = select_codec(&codecs, AVC).unwrap();
        assert_eq!(codec.name, "OMX.qcom.video.encoder.avc");
    }

    #[test]
    fn test_select_codec_ignores_decoders() {
        let mut decoder = CodecInfo::encoder("OMX.qcom.video.decoder.avc", AVC);
        decoder.is_encoder = false;
        let codecs = vec![decoder, CodecInfo::encoder("c2.android.avc.encoder", AVC)];
        assert_eq!(
            select_codec(&codecs, AVC).unwrap().name,
            "c2.android.avc.encoder"
        );
    }

    #[test]
    fn test_select_codec_skips_buggy_encoder() {
        let codecs = vec![
            CodecInfo::encoder(BUGGY_SEC_ENCODER, AVC),
            CodecInfo::encoder("OMX.qcom.video.encoder.avc", AVC),
        ];
        assert_eq!(
            select_codec(&codecs, AVC).unwrap().name,
            "OMX.qcom.video.encoder.avc"
        );
    }

    #[test]
    fn test_select_codec_paired_encoder_after_buggy() {
        let codecs = vec![
            CodecInfo::encoder(BUGGY_SEC_ENCODER, AVC),
            CodecInfo::encoder(PAIRED_SEC_ENCODER, AVC),
            CodecInfo::encoder("OMX.qcom.video.encoder.avc", AVC),
        ];
        assert_eq!(select_codec(&codecs, AVC).unwrap().name, PAIRED_SEC_ENCODER);
    }

    #[test]
    fn test_select_codec_only_buggy_encoder_is_none() {
        let codecs = vec![
            CodecInfo::encoder("OMX.qcom.video.encoder.hevc", "video/hevc"),
            CodecInfo::encoder(BUGGY_SEC_ENCODER, AVC),
        ];
        assert!(select_codec(&codecs, AVC).is_none());
    }

    #[test]
    fn test_select_codec_no_match() {
        assert!(select_codec(&[], AVC).is_none());
    }

    #[test]
    fn test_select_color_format_first_recognized() {
        let codec = CodecInfo::encoder("OMX.qcom.video.encoder.avc", AVC)
            .with_color_formats([0x7F42_0888, 21, 19]);
        assert_eq!(select_color_format(&codec, AVC), Some(ColorFormat(21)));
    }

    #[test]
    fn test_select_color_format_planar_ok_for_other_encoders() {
        let codec = CodecInfo::encoder("OMX.qcom.video.encoder.avc", AVC).with_color_formats([19, 21]);
        assert_eq!(select_color_format(&codec, AVC), Some(ColorFormat(19)));
    }

    #[test]
    fn test_select_color_format_paired_encoder_skips_planar() {
        let codec = CodecInfo::encoder(PAIRED_SEC_ENCODER, AVC).with_color_formats([19, 21]);
        assert_eq!(select_color_format(&codec, AVC), Some(ColorFormat(21)));
    }

    #[test]
    fn test_select_color_format_paired_encoder_falls_back_to_planar() {
        let codec =
            CodecInfo::encoder(PAIRED_SEC_ENCODER, AVC).with_color_formats([0x7F42_0888, 19]);
        assert_eq!(select_color_format(&codec, AVC), Some(ColorFormat(19)));
    }

    #[test]
    fn test_select_color_format_none_recognized() {
        let codec = CodecInfo::encoder("OMX.qcom.video.encoder.avc", AVC)
            .with_color_formats([0x7F42_0888, 2130708361]);
        assert_eq!(select_color_format(&codec, AVC), None);
    }

    #[test]
    fn test_select_color_format_wrong_mime() {
        let codec = CodecInfo::encoder("OMX.qcom.video.encoder.avc", AVC).with_color_formats([21]);
        assert_eq!(select_color_format(&codec, "video/hevc"), None);
    }

    #[test]
    fn test_blacklist() {
        assert_eq!(UNSUPPORTED_ENCODERS.len(), 7);
        assert!(is_blacklisted("OMX.Exynos.avc.enc"));
        assert!(is_blacklisted("OMX.TI.DUCATI1.VIDEO.H264E"));
        assert!(!is_blacklisted("OMX.qcom.video.encoder.avc"));
        assert!(!is_blacklisted(PAIRED_SEC_ENCODER));
    }

    #[test]
    fn test_gate_not_required_on_modern_platform() {
        let gate = LegacyGate::new(Some(29), 18, AVC);
        assert!(!gate.is_required());
        // Not even consulted, so a broken catalog is fine
        assert_eq!(gate.check(&FailingCatalog), Ok(None));

        let gate = LegacyGate::new(None, 18, AVC);
        assert!(!gate.is_required());
    }

    #[test]
    fn test_gate_passes_with_usable_encoder() {
        let gate = LegacyGate::new(Some(16), 18, AVC);
        let catalog = StaticCodecCatalog::new(vec![CodecInfo::encoder(
            "OMX.qcom.video.encoder.avc",
            AVC,
        )
        .with_color_formats([21])]);
        let choice = gate.check(&catalog).unwrap().unwrap();
        assert_eq!(choice.codec_name, "OMX.qcom.video.encoder.avc");
        assert_eq!(choice.color_format, ColorFormat::YUV420_SEMI_PLANAR);
    }

    #[test]
    fn test_gate_rejects_missing_codec() {
        let gate = LegacyGate::new(Some(16), 18, AVC);
        let catalog = StaticCodecCatalog::new(vec![CodecInfo::encoder(BUGGY_SEC_ENCODER, AVC)
            .with_color_formats([21])]);
        assert_eq!(
            gate.check(&catalog),
            Err(CapabilityError::NoCodec {
                mime_type: AVC.to_string()
            })
        );
    }

    #[test]
    fn test_gate_rejects_blacklisted_codec() {
        let gate = LegacyGate::new(Some(17), 18, AVC);
        let catalog = StaticCodecCatalog::new(vec![CodecInfo::encoder(
            "OMX.google.h264.encoder",
            AVC,
        )
        .with_color_formats([19])]);
        assert!(matches!(
            gate.check(&catalog),
            Err(CapabilityError::Blacklisted { name }) if name == "OMX.google.h264.encoder"
        ));
    }

    #[test]
    fn test_gate_rejects_missing_color_format() {
        let gate = LegacyGate::new(Some(16), 18, AVC);
        let catalog = StaticCodecCatalog::new(vec![CodecInfo::encoder(
            "OMX.qcom.video.encoder.avc",
            AVC,
        )]);
        assert!(matches!(
            gate.check(&catalog),
            Err(CapabilityError::NoColorFormat { .. })
        ));
    }

    #[test]
    fn test_gate_rejects_enumeration_failure() {
        let gate = LegacyGate::new(Some(16), 18, AVC);
        assert!(matches!(
            gate.check(&FailingCatalog),
            Err(CapabilityError::EnumerationFailed { .. })
        ));
    }
}
