// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use fixed_point::Fixed9;

/// Input sub-scores for the Quality Scorer, each in `[0, 1]`: originality,
/// platform-relevance, brand-safety, engagement-velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityFeatures {
    pub originality: Fixed9,
    pub platform_relevance: Fixed9,
    pub brand_safety: Fixed9,
    pub engagement_velocity: Fixed9,
}

impl Default for QualityFeatures {
    fn default() -> Self {
        QualityFeatures {
            originality: Fixed9::ONE,
            platform_relevance: Fixed9::ONE,
            brand_safety: Fixed9::ONE,
            engagement_velocity: Fixed9::ONE,
        }
    }
}

/// Lower bound of the quality multiplier range.
pub const QUALITY_MIN: Fixed9 = Fixed9::from_raw(500_000_000);
/// Upper bound.
pub const QUALITY_MAX: Fixed9 = Fixed9::from_raw(2_000_000_000);
/// Default quality multiplier for content with no distinguishing signal.
pub const QUALITY_DEFAULT: Fixed9 = Fixed9::ONE;

#[derive(Clone, Copy, Debug, Default)]
pub struct QualityScorer;

impl QualityScorer {
    /// For content-bearing events only. Combines the four sub-scores
    /// into a single multiplier in `[0.5, 2.0]`, deterministic and
    /// side-effect free.
    pub fn score(&self, features: &QualityFeatures) -> Fixed9 {
        let clamp01 = |v: Fixed9| v.clamp(Fixed9::ZERO, Fixed9::ONE);
        let weighted = clamp01(features.originality)
            .saturating_mul(Fixed9::from_ratio(35, 100))
            .saturating_add(clamp01(features.platform_relevance).saturating_mul(Fixed9::from_ratio(25, 100)))
            .saturating_add(clamp01(features.brand_safety).saturating_mul(Fixed9::from_ratio(25, 100)))
            .saturating_add(clamp01(features.engagement_velocity).saturating_mul(Fixed9::from_ratio(15, 100)));
        // weighted is in [0, 1]; map linearly onto [QUALITY_MIN, QUALITY_MAX].
        let span = QUALITY_MAX.saturating_sub(QUALITY_MIN);
        QUALITY_MIN.saturating_add(weighted.saturating_mul(span)).clamp(QUALITY_MIN, QUALITY_MAX)
    }
}
