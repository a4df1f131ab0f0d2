//! Tiered bitrate model.
//!
//! The target bitrate follows the source bitrate scaled by the resolution
//! change, biased down at low resolutions and kept between a per-tier floor
//! and ceiling.

use serde::Serialize;

/// Reference frame area the floor bitrate is expressed for (1280x720).
pub const REFERENCE_AREA: i64 = 1280 * 720;

/// Floor bitrate at the reference area for a compress factor of 1.0
/// (2 Mbps with 13% headroom).
pub const REFERENCE_FLOOR_BPS: i64 = 2_260_000;

/// One rung of the quality ladder, chosen by the short side of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityTier {
    /// Smallest short side that selects this tier.
    pub min_short_side: u32,
    /// Ceiling for the target bitrate.
    pub max_bitrate_bps: i64,
    /// Compress factor in percent.
    pub compress_percent: i64,
    /// Floor compress factor in percent.
    pub min_compress_percent: i64,
}

/// Quality ladder, highest tier first.
pub const QUALITY_TIERS: [QualityTier; 4] = [
    QualityTier {
        min_short_side: 1080,
        max_bitrate_bps: 6_800_000,
        compress_percent: 100,
        min_compress_percent: 100,
    },
    QualityTier {
        min_short_side: 720,
        max_bitrate_bps: 3_200_000,
        compress_percent: 100,
        min_compress_percent: 100,
    },
    QualityTier {
        min_short_side: 480,
        max_bitrate_bps: 1_000_000,
        compress_percent: 80,
        min_compress_percent: 90,
    },
    QualityTier {
        min_short_side: 0,
        max_bitrate_bps: 750_000,
        compress_percent: 60,
        min_compress_percent: 70,
    },
];

impl QualityTier {
    /// Selects the tier for a target frame.
    pub fn for_dimensions(height: u32, width: u32) -> &'static QualityTier {
        let short_side = height.min(width);
        QUALITY_TIERS
            .iter()
            .find(|tier| short_side >= tier.min_short_side)
            .unwrap_or(&QUALITY_TIERS[QUALITY_TIERS.len() - 1])
    }

    pub fn compress_factor(&self) -> f64 {
        self.compress_percent as f64 / 100.0
    }

    pub fn min_compress_factor(&self) -> f64 {
        self.min_compress_percent as f64 / 100.0
    }

    /// Floor bitrate for a target frame of `width` x `height`.
    pub fn min_bitrate_bps(&self, height: u32, width: u32) -> i64 {
        let base = REFERENCE_FLOOR_BPS * self.min_compress_percent / 100;
        let area = (width as i64).saturating_mul(height as i64);
        base.saturating_mul(area) / REFERENCE_AREA
    }
}

/// Computes the target bitrate for re-encoding a frame of
/// `original_width` x `original_height` at `original_bitrate` into
/// `target_width` x `target_height`.
///
/// A source already below the tier floor keeps its scaled bitrate without any
/// clamping, including against the tier ceiling. Otherwise the scaled bitrate
/// is held between the floor and the ceiling.
pub fn compute_bitrate(
    original_height: u32,
    original_width: u32,
    original_bitrate: i64,
    target_height: u32,
    target_width: u32,
) -> i64 {
    if target_height == 0 || target_width == 0 {
        return 0;
    }

    let tier = QualityTier::for_dimensions(target_height, target_width);

    let scale = (original_height as f64 / target_height as f64)
        .min(original_width as f64 / target_width as f64);
    let scaled = if scale > 0.0 && scale.is_finite() {
        (original_bitrate as f64 / scale) as i64
    } else {
        0
    };
    // Probed bitrates are untrusted; saturate instead of wrapping
    let remeasured = scaled.saturating_mul(tier.compress_percent) / 100;

    let min_bitrate = tier.min_bitrate_bps(target_height, target_width);
    if original_bitrate < min_bitrate {
        return remeasured;
    }

    remeasured.max(min_bitrate).min(tier.max_bitrate_bps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_selection_uses_short_side() {
        assert_eq!(QualityTier::for_dimensions(1080, 1920).max_bitrate_bps, 6_800_000);
        assert_eq!(QualityTier::for_dimensions(1920, 1080).max_bitrate_bps, 6_800_000);
        assert_eq!(QualityTier::for_dimensions(720, 1280).max_bitrate_bps, 3_200_000);
        assert_eq!(QualityTier::for_dimensions(480, 640).max_bitrate_bps, 1_000_000);
        assert_eq!(QualityTier::for_dimensions(360, 640).max_bitrate_bps, 750_000);
    }

    #[test]
    fn test_tier_factors() {
        let low = QualityTier::for_dimensions(240, 432);
        assert!((low.compress_factor() - 0.6).abs() < f64::EPSILON);
        assert!((low.min_compress_factor() - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_min_bitrate_at_reference_area() {
        let tier = QualityTier::for_dimensions(720, 1280);
        assert_eq!(tier.min_bitrate_bps(720, 1280), 2_260_000);

        let tier = QualityTier::for_dimensions(480, 640);
        // 0.9 * 2,260,000 / 3
        assert_eq!(tier.min_bitrate_bps(480, 640), 678_000);
    }

    #[test]
    fn test_full_hd_down_to_720p_hits_ceiling() {
        let bitrate = compute_bitrate(1080, 1920, 8_000_000, 720, 1280);
        assert_eq!(bitrate, 3_200_000);
    }

    #[test]
    fn test_floor_applies_when_source_above_floor() {
        // scaled bitrate 2,400,000 / 1.5 = 1,600,000 < floor 2,260,000
        let bitrate = compute_bitrate(1080, 1920, 2_400_000, 720, 1280);
        assert_eq!(bitrate, 2_260_000);
    }

    #[test]
    fn test_low_source_bitrate_is_not_raised_to_floor() {
        // 500 kbps is below the 678 kbps floor for 640x480
        let bitrate = compute_bitrate(480, 640, 500_000, 480, 640);
        assert_eq!(bitrate, 400_000);
    }

    #[test]
    fn test_identity_scale_yields_compress_factor() {
        // scale = 1: bitrate * compress factor, then clamped
        assert_eq!(compute_bitrate(720, 1280, 3_000_000, 720, 1280), 3_000_000);
        assert_eq!(compute_bitrate(720, 1280, 5_000_000, 720, 1280), 3_200_000);
        assert_eq!(compute_bitrate(480, 640, 900_000, 480, 640), 720_000);
    }

    #[test]
    fn test_below_floor_result_is_unclamped_against_ceiling() {
        // Upscaling a tiny low-bitrate source: scale < 1 inflates the bitrate
        // past the ceiling and the below-floor branch returns it as is.
        let bitrate = compute_bitrate(90, 160, 1_500_000, 1080, 1920);
        assert!(bitrate > 6_800_000);
    }

    #[test]
    fn test_extreme_source_bitrate_saturates() {
        assert_eq!(
            compute_bitrate(1080, 1920, 200_000_000_000_000_000, 1080, 1920),
            6_800_000
        );
        assert_eq!(compute_bitrate(1080, 1920, i64::MAX, 720, 1280), 3_200_000);
        assert_eq!(compute_bitrate(480, 640, i64::MAX, 480, 640), 1_000_000);
    }

    #[test]
    fn test_extreme_target_dimensions_do_not_overflow() {
        let tier = QualityTier::for_dimensions(u32::MAX, u32::MAX);
        assert!(tier.min_bitrate_bps(u32::MAX, u32::MAX) > 0);
        assert!(compute_bitrate(1080, 1920, 8_000_000, u32::MAX, u32::MAX) >= 0);
    }

    #[test]
    fn test_zero_target_is_zero() {
        assert_eq!(compute_bitrate(1080, 1920, 8_000_000, 0, 1280), 0);
        assert_eq!(compute_bitrate(1080, 1920, 8_000_000, 720, 0), 0);
    }

    #[test]
    fn test_zero_original_dimensions_fall_back_to_floor() {
        // No usable scale: the scaled bitrate is 0 and the floor wins.
        assert_eq!(compute_bitrate(0, 0, 8_000_000, 720, 1280), 2_260_000);
        assert_eq!(compute_bitrate(0, 0, 0, 720, 1280), 0);
    }

    #[test]
    fn test_monotonic_and_bounded_for_downscales() {
        let targets = [(1080, 1920), (720, 1280), (480, 848), (360, 640), (240, 432)];
        for (th, tw) in targets {
            let tier = QualityTier::for_dimensions(th, tw);
            let mut previous = i64::MIN;
            for step in 0..=200 {
                let original_bitrate = step * 100_000;
                let bitrate = compute_bitrate(2160, 3840, original_bitrate, th, tw);
                assert!(
                    bitrate >= previous,
                    "not monotonic at {} bps for {}x{}",
                    original_bitrate,
                    tw,
                    th
                );
                assert!(bitrate <= tier.max_bitrate_bps);
                previous = bitrate;
            }
            assert_eq!(previous, tier.max_bitrate_bps);
        }
    }
}
