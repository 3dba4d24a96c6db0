// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gathers each component's own multiplier into the
//! [`mining_rate::MiningRateInputs`] the Mining Rate Calculator needs,
//! and drives the ledger's piecewise-constant accrual step.
//!
//! Kept as free functions rather than methods on
//! [`crate::engine::RewardEngine`] so they can be called with only the
//! borrows a given operation already holds, instead of the whole engine.

use domain::{Axis, NetworkSnapshot, Timestamp, UserAggregate};
use effects::EffectRegistry;
use fixed_point::Fixed9;
use ledger::{AccrualOutcome, LedgerAccount};
use mining_rate::MiningRateBreakdown;
use staking::StakingAccount;

use crate::config::ComponentConfigs;

/// The instantaneous `$FIN`/hour rate `user` earns at right now, given
/// the current network snapshot. Zero for any lifecycle state other
/// than `Active`, per `domain::UserLifecycle::accrues_mining`.
///
/// `EffectRegistry` and `StakingAccount` both take `&mut` borrows of the
/// state they operate over even for a read-only query, so this takes
/// scratch clones rather than requiring `user` itself to be mutable.
pub fn current_rate(user: &UserAggregate, network: &NetworkSnapshot, configs: &ComponentConfigs) -> MiningRateBreakdown {
    if !user.lifecycle.accrues_mining() {
        return zero_breakdown(network.base_rate);
    }

    let mut staking_scratch = user.staking.clone();
    let staking_multiplier = StakingAccount::new(&configs.staking, &mut staking_scratch).combined_mining_multiplier();

    let mut effects_scratch = user.effects.clone();
    let effects_mining_multiplier =
        EffectRegistry::new(&configs.effects, &mut effects_scratch).axis_multiplier(user.ledger.last_accrual, Axis::Mining);

    let inputs = mining_rate::MiningRateInputs {
        base_rate: network.base_rate,
        total_users: network.total_users,
        active_referrals: user.rp.active_referral_count,
        kyc_verified: user.kyc_verified,
        cumulative_fin_earned: user.ledger.cumulative_earned,
        xp_level: user.xp.current_level,
        rp_tier: user.rp.tier,
        staking_multiplier,
        effects_mining_multiplier,
    };
    mining_rate::compute_rate(&configs.mining, &inputs)
}

fn zero_breakdown(base_rate: Fixed9) -> MiningRateBreakdown {
    MiningRateBreakdown {
        base_rate,
        pioneer_bonus: Fixed9::ZERO,
        referral_bonus: Fixed9::ZERO,
        security_bonus: Fixed9::ZERO,
        regression_factor: Fixed9::ZERO,
        xp_multiplier: Fixed9::ZERO,
        rp_multiplier: Fixed9::ZERO,
        staking_multiplier: Fixed9::ZERO,
        effects_mining_multiplier: Fixed9::ZERO,
        rate: Fixed9::ZERO,
    }
}

/// Integrates the rate in force since `user.ledger.last_accrual` up to
/// `now`, and separately advances any pending staking APY reward into
/// the same `pending_balance` bucket (a distinct reward source from
/// mining accrual, per `staking::StakingAccount::claim_staking_rewards`,
/// but settled into the same claimable balance). Must be called before
/// any mutation to `user` that could change the rate going forward (new
/// event, effect grant/expiry, stake change, level-up), per `ledger`'s
/// own contract.
pub fn accrue_to_now(user: &mut UserAggregate, network: &NetworkSnapshot, configs: &ComponentConfigs, now: Timestamp) -> AccrualOutcome {
    let rate = current_rate(user, network, configs).rate;
    let outcome = LedgerAccount::new(&configs.ledger, &mut user.ledger).accrue(rate, now, network.phase);

    let staking_reward = StakingAccount::new(&configs.staking, &mut user.staking).claim_staking_rewards(now);
    if !staking_reward.is_zero() {
        user.ledger.pending_balance = user.ledger.pending_balance.saturating_add(staking_reward);
    }

    outcome
}
