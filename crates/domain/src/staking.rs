// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;
use fixed_point::Fixed9;

/// Staking tier, a pure function of staked amount. Default thresholds
/// `{100, 500, 1000, 5000, 10000}` $FIN.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StakingTier {
    None,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

/// Stake lifecycle: `Unstaked -> Staked(tier) -> Cooldown(on unstake
/// request) -> Unstaked`. Rewards continue to accrue during `Cooldown`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeLifecycle {
    Unstaked,
    Staked,
    Cooldown,
}

/// Staking state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakingState {
    pub staked_amount: Fixed9,
    pub tier: StakingTier,
    pub lifecycle: StakeLifecycle,
    pub stake_start: Option<Timestamp>,
    pub last_reward_claim: Option<Timestamp>,
    pub loyalty_months: u32,
    /// Set when an unstake request enters cooldown; the stake continues
    /// to accrue rewards until the cooldown matures.
    pub cooldown_started: Option<Timestamp>,
}

impl Default for StakingState {
    fn default() -> Self {
        StakingState {
            staked_amount: Fixed9::ZERO,
            tier: StakingTier::None,
            lifecycle: StakeLifecycle::Unstaked,
            stake_start: None,
            last_reward_claim: None,
            loyalty_months: 0,
            cooldown_started: None,
        }
    }
}
