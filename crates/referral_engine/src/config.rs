// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use domain::RpTier;
use fixed_point::Fixed9;

/// Referral-point configuration: the L1/L2/L3 credit split, the
/// network-quality regression coefficient, and the tier threshold table.
#[derive(Clone, Debug, PartialEq)]
pub struct RpConfig {
    /// Share of `base_value` credited to a direct (L1) referrer.
    pub l1_split: Fixed9,
    /// Share credited to an indirect (L2) referrer.
    pub l2_split: Fixed9,
    /// Share credited to a great-indirect (L3) referrer.
    pub l3_split: Fixed9,
    /// `regression_coeff` for `exp(-coeff * network_size * (1 - quality))`.
    pub network_regression_coeff: Fixed9,
    /// Lower bound of Connector, Influencer, Leader, Ambassador, in that
    /// order. Explorer is everything below `tier_thresholds[0]`.
    pub tier_thresholds: [Fixed9; 4],
    /// Trailing window, in seconds, over which a referee's activity keeps
    /// it counted as "active" for its referrer's `active_referral_count`.
    pub active_window_secs: i64,
}

impl Default for RpConfig {
    fn default() -> Self {
        RpConfig {
            l1_split: Fixed9::from_ratio(10, 100),
            l2_split: Fixed9::from_ratio(5, 100),
            l3_split: Fixed9::from_ratio(3, 100),
            network_regression_coeff: Fixed9::from_ratio(1, 10_000),
            tier_thresholds: [
                Fixed9::from_integer(1_000),
                Fixed9::from_integer(5_000),
                Fixed9::from_integer(15_000),
                Fixed9::from_integer(50_000),
            ],
            active_window_secs: 30 * 86_400,
        }
    }
}

impl RpConfig {
    /// Tier is a pure function of `total_rp` over the threshold table.
    pub fn tier_for_total_rp(&self, total_rp: Fixed9) -> RpTier {
        if total_rp >= self.tier_thresholds[3] {
            RpTier::Ambassador
        } else if total_rp >= self.tier_thresholds[2] {
            RpTier::Leader
        } else if total_rp >= self.tier_thresholds[1] {
            RpTier::Influencer
        } else if total_rp >= self.tier_thresholds[0] {
            RpTier::Connector
        } else {
            RpTier::Explorer
        }
    }

    pub fn split_for_depth(&self, depth: u8) -> Option<Fixed9> {
        match depth {
            1 => Some(self.l1_split),
            2 => Some(self.l2_split),
            3 => Some(self.l3_split),
            _ => None,
        }
    }
}
