// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use domain::RpTier;
use fixed_point::Fixed9;

/// Tunables for every factor in the mining-rate product that isn't
/// already owned by another component's own config (phase base rates
/// live in `network_phase::PhaseConfig`, staking multipliers in
/// `staking::StakingConfig`).
#[derive(Clone, Debug, PartialEq)]
pub struct MiningRateConfig {
    /// `pioneer_bonus = max(pioneer_floor, pioneer_ceiling - total_users / pioneer_divisor)`.
    pub pioneer_floor: Fixed9,
    pub pioneer_ceiling: Fixed9,
    pub pioneer_divisor: i64,
    /// `referral_bonus = min(1 + referral_bonus_per_active * active_referrals, referral_bonus_ceiling)`.
    pub referral_bonus_per_active: Fixed9,
    pub referral_bonus_ceiling: Fixed9,
    pub security_bonus_verified: Fixed9,
    pub security_bonus_unverified: Fixed9,
    /// `regression_factor = exp(-regression_coeff * cumulative_fin_earned)`.
    pub regression_coeff: Fixed9,
    /// `xp_multiplier = min(1 + level * xp_multiplier_per_level, xp_multiplier_ceiling)`.
    pub xp_multiplier_per_level: Fixed9,
    pub xp_multiplier_ceiling: Fixed9,
    /// `rp_multiplier` keyed by tier, Explorer..Ambassador in order.
    pub rp_tier_multipliers: [Fixed9; 5],
    /// Absolute ceiling on the full product, to bound overflow and
    /// economic exploit. Applied last, never skipped.
    pub product_ceiling: Fixed9,
}

impl Default for MiningRateConfig {
    fn default() -> Self {
        MiningRateConfig {
            pioneer_floor: Fixed9::ONE,
            pioneer_ceiling: Fixed9::from_integer(2),
            pioneer_divisor: 1_000_000,
            referral_bonus_per_active: Fixed9::from_ratio(1, 10),
            referral_bonus_ceiling: Fixed9::from_ratio(35, 10),
            security_bonus_verified: Fixed9::from_ratio(12, 10),
            security_bonus_unverified: Fixed9::from_ratio(8, 10),
            regression_coeff: Fixed9::from_ratio(1, 1_000),
            xp_multiplier_per_level: Fixed9::from_ratio(1, 100),
            xp_multiplier_ceiling: Fixed9::from_integer(2),
            rp_tier_multipliers: [
                Fixed9::ONE,               // Explorer
                Fixed9::from_ratio(11, 10), // Connector
                Fixed9::from_ratio(12, 10), // Influencer
                Fixed9::from_ratio(13, 10), // Leader
                Fixed9::from_ratio(15, 10), // Ambassador
            ],
            product_ceiling: Fixed9::from_integer(100),
        }
    }
}

impl MiningRateConfig {
    pub fn pioneer_bonus(&self, total_users: u64) -> Fixed9 {
        let decay = Fixed9::from_integer(total_users as i64)
            .checked_div_int(self.pioneer_divisor)
            .unwrap_or(Fixed9::ZERO);
        self.pioneer_ceiling.saturating_sub(decay).max(self.pioneer_floor)
    }

    pub fn referral_bonus(&self, active_referrals: u32) -> Fixed9 {
        let gain = self
            .referral_bonus_per_active
            .saturating_mul(Fixed9::from_integer(active_referrals as i64));
        Fixed9::ONE.saturating_add(gain).min(self.referral_bonus_ceiling)
    }

    pub fn security_bonus(&self, kyc_verified: bool) -> Fixed9 {
        if kyc_verified {
            self.security_bonus_verified
        } else {
            self.security_bonus_unverified
        }
    }

    pub fn regression_factor(&self, cumulative_fin_earned: Fixed9) -> Fixed9 {
        self.regression_coeff.saturating_mul(cumulative_fin_earned).exp_neg()
    }

    pub fn xp_multiplier(&self, level: u32) -> Fixed9 {
        let gain = self.xp_multiplier_per_level.saturating_mul(Fixed9::from_integer(level as i64));
        Fixed9::ONE.saturating_add(gain).min(self.xp_multiplier_ceiling)
    }

    pub fn rp_multiplier(&self, tier: RpTier) -> Fixed9 {
        self.rp_tier_multipliers[tier as usize]
    }
}
