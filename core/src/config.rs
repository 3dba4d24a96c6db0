// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use fixed_point::Fixed9;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The single source of truth for every enumerated configuration option,
/// loadable from TOML. Each component crate keeps its own narrow config
/// type (`network_phase::PhaseConfig`, `staking::StakingConfig`, ...);
/// this struct is flat and serde-friendly, and [`RewardConfig::split`]
/// translates it into the set of component configs the engine wires up
/// at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub phase_thresholds: [u64; 3],
    pub base_rates: [Fixed9; 4],
    pub daily_caps: [Fixed9; 4],

    pub staking_thresholds: [Fixed9; 5],
    pub staking_tier_multipliers: [Fixed9; 6],
    pub staking_tier_apy: [Fixed9; 6],
    pub loyalty_gain_per_month: Fixed9,
    pub loyalty_ceiling: Fixed9,
    pub cooldown_period_secs: i64,

    pub effect_ceiling_per_axis: Fixed9,

    pub rp_l1_split: Fixed9,
    pub rp_l2_split: Fixed9,
    pub rp_l3_split: Fixed9,
    pub network_regression_coeff: Fixed9,
    pub rp_tier_thresholds: [Fixed9; 4],
    pub active_referral_window_secs: i64,

    pub mining_pioneer_floor: Fixed9,
    pub mining_pioneer_ceiling: Fixed9,
    pub mining_pioneer_divisor: i64,
    pub mining_referral_bonus_per_active: Fixed9,
    pub mining_referral_bonus_ceiling: Fixed9,
    pub mining_security_bonus_verified: Fixed9,
    pub mining_security_bonus_unverified: Fixed9,
    pub mining_regression_coeff: Fixed9,
    pub mining_xp_multiplier_per_level: Fixed9,
    pub mining_xp_multiplier_ceiling: Fixed9,
    pub mining_rp_tier_multipliers: [Fixed9; 5],
    pub product_ceiling: Fixed9,

    pub daily_window_secs: i64,

    pub dedup_stale_grace_secs: i64,
    pub dedup_future_grace_secs: i64,

    /// Default local-timezone offset for users with no platform-supplied
    /// offset. Expressed in minutes east of UTC.
    pub default_utc_offset_minutes: i32,
    /// How old `last_accrual` may grow before a background sweep forces
    /// an accrual step for an otherwise-idle user.
    pub accrual_overdue_secs: i64,
    /// Cadence of the background sweeper; bounded to one minute per
    /// `spec.md` §5.
    pub sweep_interval_secs: u64,
    /// Ceiling on retry attempts for a transient ingest failure before
    /// it is parked in a dead-letter state.
    pub claim_retry_backoff_ceiling: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        let phase = network_phase::PhaseConfig::default();
        let staking = staking::StakingConfig::default();
        let effects = effects::EffectConfig::default();
        let rp = referral_engine::RpConfig::default();
        let mining = mining_rate::MiningRateConfig::default();
        let ledger = ledger::LedgerConfig::default();
        let intake = event_intake::IntakeConfig::default();

        RewardConfig {
            phase_thresholds: phase.thresholds,
            base_rates: phase.base_rates,
            daily_caps: ledger.daily_caps,

            staking_thresholds: staking.thresholds,
            staking_tier_multipliers: staking.tier_multipliers,
            staking_tier_apy: staking.tier_apy,
            loyalty_gain_per_month: staking.loyalty_gain_per_month,
            loyalty_ceiling: staking.loyalty_ceiling,
            cooldown_period_secs: staking.cooldown_period_secs,

            effect_ceiling_per_axis: effects.ceiling_per_axis,

            rp_l1_split: rp.l1_split,
            rp_l2_split: rp.l2_split,
            rp_l3_split: rp.l3_split,
            network_regression_coeff: rp.network_regression_coeff,
            rp_tier_thresholds: rp.tier_thresholds,
            active_referral_window_secs: rp.active_window_secs,

            mining_pioneer_floor: mining.pioneer_floor,
            mining_pioneer_ceiling: mining.pioneer_ceiling,
            mining_pioneer_divisor: mining.pioneer_divisor,
            mining_referral_bonus_per_active: mining.referral_bonus_per_active,
            mining_referral_bonus_ceiling: mining.referral_bonus_ceiling,
            mining_security_bonus_verified: mining.security_bonus_verified,
            mining_security_bonus_unverified: mining.security_bonus_unverified,
            mining_regression_coeff: mining.regression_coeff,
            mining_xp_multiplier_per_level: mining.xp_multiplier_per_level,
            mining_xp_multiplier_ceiling: mining.xp_multiplier_ceiling,
            mining_rp_tier_multipliers: mining.rp_tier_multipliers,
            product_ceiling: mining.product_ceiling,

            daily_window_secs: ledger.daily_window_secs,

            dedup_stale_grace_secs: intake.stale_grace_secs,
            dedup_future_grace_secs: intake.future_grace_secs,

            default_utc_offset_minutes: 0,
            accrual_overdue_secs: 300,
            sweep_interval_secs: 60,
            claim_retry_backoff_ceiling: 6,
        }
    }
}

/// Every component config, built once from a validated [`RewardConfig`].
pub struct ComponentConfigs {
    pub phase: network_phase::PhaseConfig,
    pub staking: staking::StakingConfig,
    pub effects: effects::EffectConfig,
    pub rp: referral_engine::RpConfig,
    pub mining: mining_rate::MiningRateConfig,
    pub ledger: ledger::LedgerConfig,
    pub intake: event_intake::IntakeConfig,
}

impl RewardConfig {
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::InvalidConfig(format!("reading {}: {e}", path.display())))?;
        let config: RewardConfig =
            toml::from_str(&raw).map_err(|e| EngineError::InvalidConfig(format!("parsing {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validated once at load, per `spec.md` §9's replacement for
    /// dynamic-typed config maps: explicit fields with explicit checks
    /// rather than trusting whatever a caller hands in.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.phase_thresholds[0] < self.phase_thresholds[1] && self.phase_thresholds[1] < self.phase_thresholds[2]) {
            return Err(EngineError::InvalidConfig("phase_thresholds must be strictly increasing".into()));
        }
        if self.base_rates.iter().any(|r| r.is_negative() || r.is_zero()) {
            return Err(EngineError::InvalidConfig("base_rates must all be positive".into()));
        }
        if self.daily_caps.iter().any(|c| c.is_negative() || c.is_zero()) {
            return Err(EngineError::InvalidConfig("daily_caps must all be positive".into()));
        }
        if self.product_ceiling.is_negative() || self.product_ceiling.is_zero() {
            return Err(EngineError::InvalidConfig("product_ceiling must be positive".into()));
        }
        if self.sweep_interval_secs == 0 || self.sweep_interval_secs > 60 {
            return Err(EngineError::InvalidConfig("sweep_interval_secs must be in (0, 60]".into()));
        }
        Ok(())
    }

    pub fn split(&self) -> Result<ComponentConfigs, EngineError> {
        self.validate()?;

        let phase = network_phase::PhaseConfig {
            thresholds: self.phase_thresholds,
            base_rates: self.base_rates,
        };
        phase.validate()?;

        let staking = staking::StakingConfig {
            thresholds: self.staking_thresholds,
            tier_multipliers: self.staking_tier_multipliers,
            tier_apy: self.staking_tier_apy,
            loyalty_gain_per_month: self.loyalty_gain_per_month,
            loyalty_ceiling: self.loyalty_ceiling,
            cooldown_period_secs: self.cooldown_period_secs,
        };

        let effects = effects::EffectConfig {
            ceiling_per_axis: self.effect_ceiling_per_axis,
        };

        let rp = referral_engine::RpConfig {
            l1_split: self.rp_l1_split,
            l2_split: self.rp_l2_split,
            l3_split: self.rp_l3_split,
            network_regression_coeff: self.network_regression_coeff,
            tier_thresholds: self.rp_tier_thresholds,
            active_window_secs: self.active_referral_window_secs,
        };

        let mining = mining_rate::MiningRateConfig {
            pioneer_floor: self.mining_pioneer_floor,
            pioneer_ceiling: self.mining_pioneer_ceiling,
            pioneer_divisor: self.mining_pioneer_divisor,
            referral_bonus_per_active: self.mining_referral_bonus_per_active,
            referral_bonus_ceiling: self.mining_referral_bonus_ceiling,
            security_bonus_verified: self.mining_security_bonus_verified,
            security_bonus_unverified: self.mining_security_bonus_unverified,
            regression_coeff: self.mining_regression_coeff,
            xp_multiplier_per_level: self.mining_xp_multiplier_per_level,
            xp_multiplier_ceiling: self.mining_xp_multiplier_ceiling,
            rp_tier_multipliers: self.mining_rp_tier_multipliers,
            product_ceiling: self.product_ceiling,
        };

        let ledger = ledger::LedgerConfig {
            daily_caps: self.daily_caps,
            daily_window_secs: self.daily_window_secs,
        };

        let intake = event_intake::IntakeConfig {
            stale_grace_secs: self.dedup_stale_grace_secs,
            future_grace_secs: self.dedup_future_grace_secs,
        };

        Ok(ComponentConfigs {
            phase,
            staking,
            effects,
            rp,
            mining,
            ledger,
            intake,
        })
    }
}
