// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staking State: tracks a single user's staked amount, derived tier,
//! lockup/cooldown lifecycle, and loyalty accrual, and computes the
//! continuously-accruing APY reward bucket.
//!
//! This crate never reads the mining-rate ledger; the `staking_multiplier`
//! it exposes is read by `mining_rate` as one factor among several.

use domain::{StakeLifecycle, StakingState, StakingTier, Timestamp};
use fixed_point::Fixed9;
use thiserror::Error;

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;
const LOYALTY_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("insufficient stake: have {have}, requested to unstake {requested}")]
    InsufficientStake { have: Fixed9, requested: Fixed9 },
    #[error("stake amount must be positive")]
    NonPositiveAmount,
    #[error("no stake is in cooldown")]
    NotInCooldown,
    #[error("cooldown has not yet matured")]
    CooldownNotMatured,
}

/// Per-tier APY and mining-multiplier step table, over the default
/// `{100, 500, 1000, 5000, 10000}` threshold set, with APY percent and
/// mining multiplier kept as separate per-tier fields rather than one
/// derived from the other.
#[derive(Clone, Debug, PartialEq)]
pub struct StakingConfig {
    /// Staked-amount thresholds for Bronze, Silver, Gold, Platinum,
    /// Diamond, in that order.
    pub thresholds: [Fixed9; 5],
    /// `staking_multiplier` for None, Bronze, Silver, Gold, Platinum,
    /// Diamond, bounded to the `[1.0, 2.0]` range.
    pub tier_multipliers: [Fixed9; 6],
    /// Annual percentage yield for None, Bronze, Silver, Gold, Platinum,
    /// Diamond, as a fraction (`0.08` == 8%).
    pub tier_apy: [Fixed9; 6],
    /// Loyalty bonus cap: `1 + min(loyalty_months * 0.05, 0.5)`.
    pub loyalty_gain_per_month: Fixed9,
    pub loyalty_ceiling: Fixed9,
    /// Cooldown duration between an unstake request and funds becoming
    /// fully unstaked. See `DESIGN.md` for the chosen default.
    pub cooldown_period_secs: i64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        StakingConfig {
            thresholds: [
                Fixed9::from_integer(100),
                Fixed9::from_integer(500),
                Fixed9::from_integer(1_000),
                Fixed9::from_integer(5_000),
                Fixed9::from_integer(10_000),
            ],
            tier_multipliers: [
                Fixed9::ONE,
                Fixed9::from_ratio(120, 100),
                Fixed9::from_ratio(135, 100),
                Fixed9::from_ratio(150, 100),
                Fixed9::from_ratio(175, 100),
                Fixed9::from_ratio(200, 100),
            ],
            tier_apy: [
                Fixed9::ZERO,
                Fixed9::from_ratio(8, 100),
                Fixed9::from_ratio(10, 100),
                Fixed9::from_ratio(12, 100),
                Fixed9::from_ratio(14, 100),
                Fixed9::from_ratio(15, 100),
            ],
            loyalty_gain_per_month: Fixed9::from_ratio(5, 100),
            loyalty_ceiling: Fixed9::from_ratio(5, 10),
            cooldown_period_secs: 3 * SECONDS_PER_DAY,
        }
    }
}

impl StakingConfig {
    pub fn tier_for_amount(&self, amount: Fixed9) -> StakingTier {
        let tiers = [
            StakingTier::Bronze,
            StakingTier::Silver,
            StakingTier::Gold,
            StakingTier::Platinum,
            StakingTier::Diamond,
        ];
        let mut tier = StakingTier::None;
        for (threshold, candidate) in self.thresholds.iter().zip(tiers) {
            if amount >= *threshold {
                tier = candidate;
            }
        }
        tier
    }

    fn tier_index(tier: StakingTier) -> usize {
        match tier {
            StakingTier::None => 0,
            StakingTier::Bronze => 1,
            StakingTier::Silver => 2,
            StakingTier::Gold => 3,
            StakingTier::Platinum => 4,
            StakingTier::Diamond => 5,
        }
    }

    pub fn mining_multiplier(&self, tier: StakingTier) -> Fixed9 {
        self.tier_multipliers[Self::tier_index(tier)]
    }

    pub fn apy(&self, tier: StakingTier) -> Fixed9 {
        self.tier_apy[Self::tier_index(tier)]
    }

    /// `1 + min(loyalty_months * 0.05, 0.5)`.
    pub fn loyalty_bonus(&self, loyalty_months: u32) -> Fixed9 {
        let raw = self.loyalty_gain_per_month.saturating_mul(Fixed9::from_integer(loyalty_months as i64));
        Fixed9::ONE.saturating_add(raw.min(self.loyalty_ceiling))
    }
}

/// Stateful staking operations over a single user's [`StakingState`].
pub struct StakingAccount<'a> {
    config: &'a StakingConfig,
    state: &'a mut StakingState,
}

impl<'a> StakingAccount<'a> {
    pub fn new(config: &'a StakingConfig, state: &'a mut StakingState) -> Self {
        StakingAccount { config, state }
    }

    fn recompute_tier(&mut self) {
        self.state.tier = self.config.tier_for_amount(self.state.staked_amount);
    }

    /// `stake(amount)`. Starts the stake clock on a first deposit;
    /// subsequent top-ups do not reset `stake_start`, so loyalty accrual
    /// is continuous.
    pub fn stake(&mut self, amount: Fixed9, now: Timestamp) -> Result<(), Error> {
        if amount.is_negative() || amount.is_zero() {
            return Err(Error::NonPositiveAmount);
        }
        if self.state.stake_start.is_none() {
            self.state.stake_start = Some(now);
        }
        self.state.staked_amount = self.state.staked_amount.saturating_add(amount);
        self.state.lifecycle = StakeLifecycle::Staked;
        self.recompute_loyalty(now);
        self.recompute_tier();
        Ok(())
    }

    /// `unstake(amount)`. Enters `Cooldown`; rewards keep accruing at the
    /// pre-unstake tier until [`Self::finalize_unstake`] matures.
    pub fn unstake(&mut self, amount: Fixed9, now: Timestamp) -> Result<(), Error> {
        if amount.is_negative() || amount.is_zero() {
            return Err(Error::NonPositiveAmount);
        }
        if amount > self.state.staked_amount {
            return Err(Error::InsufficientStake {
                have: self.state.staked_amount,
                requested: amount,
            });
        }
        self.state.staked_amount = self.state.staked_amount.saturating_sub(amount);
        self.state.lifecycle = StakeLifecycle::Cooldown;
        self.state.cooldown_started = Some(now);
        self.recompute_tier();
        Ok(())
    }

    /// Completes a pending cooldown once `cooldown_period_secs` has
    /// elapsed. A full unstake (`staked_amount` reaches zero) resets
    /// loyalty months to zero.
    pub fn finalize_unstake(&mut self, now: Timestamp) -> Result<(), Error> {
        let started = self.state.cooldown_started.ok_or(Error::NotInCooldown)?;
        if started.elapsed_secs_until(now) < self.config.cooldown_period_secs as u64 {
            return Err(Error::CooldownNotMatured);
        }
        self.state.cooldown_started = None;
        if self.state.staked_amount.is_zero() {
            self.state.lifecycle = StakeLifecycle::Unstaked;
            self.state.stake_start = None;
            self.state.loyalty_months = 0;
        } else {
            self.state.lifecycle = StakeLifecycle::Staked;
        }
        Ok(())
    }

    fn recompute_loyalty(&mut self, now: Timestamp) {
        if let Some(start) = self.state.stake_start {
            let elapsed_days = start.elapsed_secs_until(now) as i64 / SECONDS_PER_DAY;
            self.state.loyalty_months = (elapsed_days / LOYALTY_PERIOD_DAYS).max(0) as u32;
        }
    }

    /// Pending APY reward since `last_reward_claim` (or `stake_start` if
    /// never claimed), truncated to the configured fixed-point precision.
    /// `staked · APY(tier) · elapsed_time / year`.
    pub fn pending_staking_reward(&self, now: Timestamp) -> Fixed9 {
        let since = self.state.last_reward_claim.or(self.state.stake_start);
        let Some(since) = since else {
            return Fixed9::ZERO;
        };
        if self.state.staked_amount.is_zero() {
            return Fixed9::ZERO;
        }
        let elapsed = since.elapsed_secs_until(now) as i64;
        let apy = self.config.apy(self.state.tier);
        let annualized = self.state.staked_amount.saturating_mul(apy);
        annualized.saturating_mul(Fixed9::from_ratio(elapsed as i64, SECONDS_PER_YEAR))
    }

    /// `claim_staking_rewards() -> amount`. Callers are responsible for
    /// crediting the returned amount to the ledger — APY rewards are paid
    /// from a separate bucket from mining accrual; this call only
    /// advances the claim watermark.
    pub fn claim_staking_rewards(&mut self, now: Timestamp) -> Fixed9 {
        let amount = self.pending_staking_reward(now);
        self.state.last_reward_claim = Some(now);
        amount
    }

    /// Recomputes `loyalty_months` without mutating the stake itself;
    /// called by the orchestrator's periodic sweeper so loyalty keeps
    /// advancing for users who are not actively staking/unstaking.
    pub fn refresh_loyalty(&mut self, now: Timestamp) {
        self.recompute_loyalty(now);
    }

    /// Combined `staking_multiplier` for the mining rate formula: tier
    /// multiplier augmented by the loyalty bonus.
    pub fn combined_mining_multiplier(&self) -> Fixed9 {
        let tier_mult = self.config.mining_multiplier(self.state.tier);
        let loyalty = self.config.loyalty_bonus(self.state.loyalty_months);
        tier_mult.saturating_mul(loyalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs)
    }

    #[test]
    fn tier_is_pure_function_of_amount() {
        let config = StakingConfig::default();
        assert_eq!(config.tier_for_amount(Fixed9::from_integer(0)), StakingTier::None);
        assert_eq!(config.tier_for_amount(Fixed9::from_integer(100)), StakingTier::Bronze);
        assert_eq!(config.tier_for_amount(Fixed9::from_integer(499)), StakingTier::Bronze);
        assert_eq!(config.tier_for_amount(Fixed9::from_integer(10_000)), StakingTier::Diamond);
    }

    #[test]
    fn stake_then_unstake_enters_cooldown_and_keeps_accruing_tier() {
        let config = StakingConfig::default();
        let mut state = StakingState::default();
        {
            let mut acct = StakingAccount::new(&config, &mut state);
            acct.stake(Fixed9::from_integer(1_000), ts(0)).unwrap();
            assert_eq!(acct.state.tier, StakingTier::Gold);
            acct.unstake(Fixed9::from_integer(400), ts(10)).unwrap();
        }
        assert_eq!(state.lifecycle, StakeLifecycle::Cooldown);
        assert_eq!(state.staked_amount, Fixed9::from_integer(600));
        assert_eq!(state.tier, StakingTier::Silver);
    }

    #[test]
    fn full_unstake_resets_loyalty_after_cooldown_matures() {
        let config = StakingConfig::default();
        let mut state = StakingState::default();
        {
            let mut acct = StakingAccount::new(&config, &mut state);
            acct.stake(Fixed9::from_integer(500), ts(0)).unwrap();
            acct.unstake(Fixed9::from_integer(500), ts(60 * SECONDS_PER_DAY)).unwrap();
            assert_eq!(
                acct.finalize_unstake(ts(60 * SECONDS_PER_DAY + 10)),
                Err(Error::CooldownNotMatured)
            );
            acct.finalize_unstake(ts(60 * SECONDS_PER_DAY + config.cooldown_period_secs))
                .unwrap();
        }
        assert_eq!(state.lifecycle, StakeLifecycle::Unstaked);
        assert_eq!(state.loyalty_months, 0);
        assert_eq!(state.stake_start, None);
    }

    #[test]
    fn pending_reward_matches_apy_formula() {
        let config = StakingConfig::default();
        let mut state = StakingState::default();
        let mut acct = StakingAccount::new(&config, &mut state);
        acct.stake(Fixed9::from_integer(1_000), ts(0)).unwrap(); // Gold tier, 12% APY
        let reward = acct.pending_staking_reward(ts(SECONDS_PER_YEAR));
        // 1000 * 0.12 * 1 year/year == 120
        assert_eq!(reward, Fixed9::from_integer(120));
    }

    #[test]
    fn claim_resets_pending_to_zero() {
        let config = StakingConfig::default();
        let mut state = StakingState::default();
        let mut acct = StakingAccount::new(&config, &mut state);
        acct.stake(Fixed9::from_integer(1_000), ts(0)).unwrap();
        let claimed = acct.claim_staking_rewards(ts(SECONDS_PER_YEAR));
        assert!(claimed > Fixed9::ZERO);
        assert_eq!(acct.pending_staking_reward(ts(SECONDS_PER_YEAR)), Fixed9::ZERO);
    }

    #[test]
    fn insufficient_stake_is_rejected() {
        let config = StakingConfig::default();
        let mut state = StakingState::default();
        let mut acct = StakingAccount::new(&config, &mut state);
        acct.stake(Fixed9::from_integer(100), ts(0)).unwrap();
        assert_eq!(
            acct.unstake(Fixed9::from_integer(200), ts(1)),
            Err(Error::InsufficientStake {
                have: Fixed9::from_integer(100),
                requested: Fixed9::from_integer(200),
            })
        );
    }

    #[test]
    fn loyalty_bonus_is_capped() {
        let config = StakingConfig::default();
        assert_eq!(config.loyalty_bonus(0), Fixed9::ONE);
        assert_eq!(config.loyalty_bonus(10), Fixed9::from_ratio(150, 100));
        // 20 months * 0.05 == 1.0, capped at 0.5 => 1.5 ceiling reached earlier
        assert_eq!(config.loyalty_bonus(100), Fixed9::from_ratio(150, 100));
    }
}
