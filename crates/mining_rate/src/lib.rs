// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mining Rate Calculator: the instantaneous `$FIN/hour` rate a user
//! earns at, computed as a pure product of factors owned by other
//! components.
//!
//! This crate takes no dependency on `network_phase`, `staking`,
//! `effects`, `scoring`, `xp_engine` or `referral_engine` — each of
//! those already exposes its own multiplier (`PhaseOracle::snapshot`,
//! `StakingAccount::combined_mining_multiplier`,
//! `EffectRegistry::axis_multiplier(Axis::Mining)`, and so on); the
//! caller gathers them into a [`MiningRateInputs`] and this crate only
//! does the final multiplication and ceiling clamp. That keeps rate
//! computation a pure function with no side effects, as required, and
//! lets each factor be unit-tested against its own owning component.

mod config;

pub use config::MiningRateConfig;

use domain::RpTier;
use fixed_point::Fixed9;

/// Every input the mining-rate product needs, gathered fresh by the
/// caller from each owning component's current snapshot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MiningRateInputs {
    pub base_rate: Fixed9,
    pub total_users: u64,
    pub active_referrals: u32,
    pub kyc_verified: bool,
    pub cumulative_fin_earned: Fixed9,
    pub xp_level: u32,
    pub rp_tier: RpTier,
    pub staking_multiplier: Fixed9,
    pub effects_mining_multiplier: Fixed9,
}

/// One factor from each stage of the product, kept around for
/// diagnostics and the claim ledger's audit trail; never serialized as
/// the authoritative rate on its own.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MiningRateBreakdown {
    pub base_rate: Fixed9,
    pub pioneer_bonus: Fixed9,
    pub referral_bonus: Fixed9,
    pub security_bonus: Fixed9,
    pub regression_factor: Fixed9,
    pub xp_multiplier: Fixed9,
    pub rp_multiplier: Fixed9,
    pub staking_multiplier: Fixed9,
    pub effects_mining_multiplier: Fixed9,
    /// The clamped, final `$FIN/hour` rate.
    pub rate: Fixed9,
}

/// Computes the instantaneous mining rate, clamped to
/// `base_rate * product_ceiling`. The whale-brake regression factor is
/// always applied; there is no code path that skips it.
pub fn compute_rate(config: &MiningRateConfig, inputs: &MiningRateInputs) -> MiningRateBreakdown {
    let pioneer_bonus = config.pioneer_bonus(inputs.total_users);
    let referral_bonus = config.referral_bonus(inputs.active_referrals);
    let security_bonus = config.security_bonus(inputs.kyc_verified);
    let regression_factor = config.regression_factor(inputs.cumulative_fin_earned);
    let xp_multiplier = config.xp_multiplier(inputs.xp_level);
    let rp_multiplier = config.rp_multiplier(inputs.rp_tier);

    let product = inputs
        .base_rate
        .saturating_mul(pioneer_bonus)
        .saturating_mul(referral_bonus)
        .saturating_mul(security_bonus)
        .saturating_mul(regression_factor)
        .saturating_mul(xp_multiplier)
        .saturating_mul(rp_multiplier)
        .saturating_mul(inputs.staking_multiplier)
        .saturating_mul(inputs.effects_mining_multiplier);

    let ceiling = inputs.base_rate.saturating_mul(config.product_ceiling);
    let rate = product.min(ceiling);

    if product > ceiling {
        tracing::warn!(?product, ?ceiling, "mining rate product clamped at ceiling");
    }

    MiningRateBreakdown {
        base_rate: inputs.base_rate,
        pioneer_bonus,
        referral_bonus,
        security_bonus,
        regression_factor,
        xp_multiplier,
        rp_multiplier,
        staking_multiplier: inputs.staking_multiplier,
        effects_mining_multiplier: inputs.effects_mining_multiplier,
        rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline_inputs() -> MiningRateInputs {
        MiningRateInputs {
            base_rate: Fixed9::from_ratio(1, 10),
            total_users: 100_000,
            active_referrals: 0,
            kyc_verified: true,
            cumulative_fin_earned: Fixed9::ZERO,
            xp_level: 1,
            rp_tier: RpTier::Explorer,
            staking_multiplier: Fixed9::ONE,
            effects_mining_multiplier: Fixed9::ONE,
        }
    }

    #[test]
    fn fresh_pioneer_kyc_verified_user_matches_expected_rate() {
        let config = MiningRateConfig::default();
        let breakdown = compute_rate(&config, &baseline_inputs());

        assert_eq!(breakdown.pioneer_bonus, Fixed9::from_ratio(19, 10));
        assert_eq!(breakdown.referral_bonus, Fixed9::ONE);
        assert_eq!(breakdown.security_bonus, Fixed9::from_ratio(12, 10));
        assert_eq!(breakdown.regression_factor, Fixed9::ONE);

        // 0.1 * 1.9 * 1.0 * 1.2 * 1.0 * xp(level 1) * rp(Explorer) * 1.0 * 1.0
        let xp_mult = config.xp_multiplier(1);
        let expected = Fixed9::from_ratio(1, 10)
            .saturating_mul(Fixed9::from_ratio(19, 10))
            .saturating_mul(Fixed9::from_ratio(12, 10))
            .saturating_mul(xp_mult);
        assert_eq!(breakdown.rate, expected);
    }

    #[test]
    fn whale_brake_reduces_rate_to_expected_fraction() {
        let config = MiningRateConfig::default();
        let mut inputs = baseline_inputs();
        inputs.cumulative_fin_earned = Fixed9::from_integer(1_000);
        let breakdown = compute_rate(&config, &inputs);

        // exp(-0.001 * 1000) = exp(-1) ~= 0.367879441
        let diff = (breakdown.regression_factor.checked_sub(Fixed9::from_ratio(367_879_441, 1_000_000_000)))
            .map(|d| if d.is_negative() { Fixed9::ZERO.checked_sub(d).unwrap() } else { d })
            .unwrap();
        assert!(diff < Fixed9::from_ratio(1, 1_000_000), "regression factor {:?} off expected e^-1", breakdown.regression_factor);
    }

    #[test]
    fn rate_never_exceeds_base_rate_times_product_ceiling() {
        let config = MiningRateConfig::default();
        let inputs = MiningRateInputs {
            base_rate: Fixed9::from_ratio(1, 10),
            total_users: 0,
            active_referrals: 1_000,
            kyc_verified: true,
            cumulative_fin_earned: Fixed9::ZERO,
            xp_level: 10_000,
            rp_tier: RpTier::Ambassador,
            staking_multiplier: Fixed9::from_integer(2),
            effects_mining_multiplier: Fixed9::from_integer(10),
        };
        let breakdown = compute_rate(&config, &inputs);
        let ceiling = inputs.base_rate.saturating_mul(config.product_ceiling);
        assert_eq!(breakdown.rate, ceiling);
    }

    #[test]
    fn referral_bonus_caps_at_ceiling() {
        let config = MiningRateConfig::default();
        assert_eq!(config.referral_bonus(1_000), config.referral_bonus_ceiling);
    }

    #[test]
    fn pioneer_bonus_floors_at_one() {
        let config = MiningRateConfig::default();
        assert_eq!(config.pioneer_bonus(10_000_000), config.pioneer_floor);
    }

    #[test]
    fn security_bonus_penalizes_unverified_users() {
        let config = MiningRateConfig::default();
        assert_eq!(config.security_bonus(false), Fixed9::from_ratio(8, 10));
    }

    #[test]
    fn xp_multiplier_caps_at_ceiling() {
        let config = MiningRateConfig::default();
        assert_eq!(config.xp_multiplier(500), config.xp_multiplier_ceiling);
    }

    #[test]
    fn rp_multiplier_is_monotone_by_tier() {
        let config = MiningRateConfig::default();
        assert!(config.rp_multiplier(RpTier::Explorer) < config.rp_multiplier(RpTier::Connector));
        assert!(config.rp_multiplier(RpTier::Connector) < config.rp_multiplier(RpTier::Influencer));
        assert!(config.rp_multiplier(RpTier::Influencer) < config.rp_multiplier(RpTier::Leader));
        assert!(config.rp_multiplier(RpTier::Leader) < config.rp_multiplier(RpTier::Ambassador));
    }
}
