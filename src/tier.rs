//! Resolution tiers and the scale factor each one maps to.
//!
//! Every tier targets a print resolution and scales the source by
//! `target_ppi / BASE_PPI`, so the identity tier keeps the original
//! dimensions and the lower tiers shrink both sides linearly.

use crate::constants::{BASE_PPI, DEFAULT_TIER_ID};
use crate::error::{CompressionError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityTier {
    pub id: &'static str,
    pub label: &'static str,
    pub ppi: u32,
    pub description: &'static str,
    pub scale: f64,
}

const BASE: f64 = BASE_PPI as f64;

/// Ordered from the highest resolution to the lowest.
pub const QUALITY_TIERS: [QualityTier; 4] = [
    QualityTier {
        id: "hd",
        label: "HD quality",
        ppi: 330,
        description: "330ppi",
        scale: 330.0 / BASE,
    },
    QualityTier {
        id: "print",
        label: "Print quality",
        ppi: 220,
        description: "220ppi",
        scale: 220.0 / BASE,
    },
    QualityTier {
        id: "web",
        label: "Web quality",
        ppi: 150,
        description: "150ppi",
        scale: 150.0 / BASE,
    },
    QualityTier {
        id: "minimal",
        label: "Minimal quality",
        ppi: 96,
        description: "96ppi",
        scale: 96.0 / BASE,
    },
];

/// Linear scale factor applied to both sides of a source image.
pub fn scale_for(tier: &QualityTier) -> f64 {
    tier.scale
}

pub fn default_tier() -> QualityTier {
    // The table is static and always contains the default id.
    find_tier(DEFAULT_TIER_ID).unwrap_or(QUALITY_TIERS[0])
}

pub fn find_tier(id: &str) -> Option<QualityTier> {
    QUALITY_TIERS
        .iter()
        .find(|t| t.id.eq_ignore_ascii_case(id))
        .copied()
}

pub fn tier_for_ppi(ppi: u32) -> Option<QualityTier> {
    QUALITY_TIERS.iter().find(|t| t.ppi == ppi).copied()
}

impl QualityTier {
    pub fn is_identity(&self) -> bool {
        self.ppi == BASE_PPI
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.description)
    }
}

impl FromStr for QualityTier {
    type Err = CompressionError;

    /// Accepts a tier id (`web`) or a resolution (`150`, `150ppi`).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(found) = find_tier(trimmed) {
            return Ok(found);
        }

        let digits = trimmed
            .strip_suffix("ppi")
            .or_else(|| trimmed.strip_suffix("PPI"))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .ok()
            .and_then(tier_for_ppi)
            .ok_or_else(|| CompressionError::UnknownTier(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scales() {
        let scales: Vec<f64> = QUALITY_TIERS.iter().map(scale_for).collect();
        assert_eq!(scales[0], 1.0);
        assert!((scales[1] - 0.667).abs() < 0.001);
        assert!((scales[2] - 0.455).abs() < 0.001);
        assert!((scales[3] - 0.291).abs() < 0.001);
    }

    #[test]
    fn test_scales_within_unit_interval() {
        for t in QUALITY_TIERS.iter() {
            let scale = scale_for(t);
            assert!(scale > 0.0 && scale <= 1.0, "{} has scale {}", t.id, scale);
        }
    }

    #[test]
    fn test_scale_non_decreasing_with_resolution() {
        let mut tiers = QUALITY_TIERS.to_vec();
        tiers.sort_by_key(|t| t.ppi);
        for pair in tiers.windows(2) {
            assert!(scale_for(&pair[0]) <= scale_for(&pair[1]));
        }
    }

    #[test]
    fn test_only_hd_is_identity() {
        let identities: Vec<_> = QUALITY_TIERS.iter().filter(|t| t.is_identity()).collect();
        assert_eq!(identities.len(), 1);
        assert_eq!(identities[0].id, "hd");
    }

    #[test]
    fn test_default_tier_is_web() {
        let t = default_tier();
        assert_eq!(t.id, "web");
        assert_eq!(t.ppi, 150);
    }

    #[test]
    fn test_find_tier_case_insensitive() {
        assert_eq!(find_tier("PRINT").map(|t| t.ppi), Some(220));
        assert!(find_tier("ultra").is_none());
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!(QualityTier::from_str("minimal").unwrap().ppi, 96);
        assert_eq!(QualityTier::from_str("220").unwrap().id, "print");
        assert_eq!(QualityTier::from_str("150ppi").unwrap().id, "web");
        assert!(matches!(
            QualityTier::from_str("72"),
            Err(CompressionError::UnknownTier(_))
        ));
    }

    #[test]
    fn test_tier_display() {
        assert_eq!(default_tier().to_string(), "Web quality (150ppi)");
    }
}
