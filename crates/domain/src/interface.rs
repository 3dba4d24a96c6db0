// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External interface contracts consumed from and exposed to collaborators
//! outside this core. Wire format is left to whichever collaborator
//! serializes these (HTTP/WebSocket transport is out of scope for this
//! core); only field semantics are fixed here.

use serde::{Deserialize, Serialize};

use crate::effects::{MultiplierVec, StackingClass};
use crate::event::{ActivityType, DeviceInfo, Engagement, Platform};
use crate::ids::{ClaimNonce, EffectSourceId, ExternalEventId, UserId};
use crate::network::Phase;
use crate::rp::RpState;
use crate::staking::StakingState;
use crate::time::Timestamp;
use crate::xp::XpState;
use fixed_point::Fixed9;

// ---- Consumed from external collaborators ----------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserCreated {
    pub user_id: UserId,
    pub referrer_id: Option<UserId>,
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KycStatusChanged {
    pub user_id: UserId,
    pub verified: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocialActivity {
    pub user_id: UserId,
    pub external_id: ExternalEventId,
    pub platform: Platform,
    pub activity_type: ActivityType,
    pub content_fingerprint: Option<String>,
    pub engagement: Engagement,
    pub device_info: DeviceInfo,
    pub timestamp: Timestamp,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeOperationKind {
    Stake,
    Unstake,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakeOperation {
    pub user_id: UserId,
    pub delta: Fixed9,
    pub kind: StakeOperationKind,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectGranted {
    pub user_id: UserId,
    pub source: EffectSourceId,
    pub class: StackingClass,
    pub mining_mult: Fixed9,
    pub xp_mult: Fixed9,
    pub rp_mult: Fixed9,
    pub expiry: Timestamp,
}

impl EffectGranted {
    pub fn multiplier_vec(&self) -> MultiplierVec {
        MultiplierVec {
            mining: self.mining_mult,
            xp: self.xp_mult,
            rp: self.rp_mult,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaimRequested {
    pub user_id: UserId,
    pub claim_nonce: ClaimNonce,
}

// ---- Exposed to external collaborators ---------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardClaimed {
    pub user_id: UserId,
    pub amount: Fixed9,
    pub cumulative_earned: Fixed9,
    pub claim_nonce: ClaimNonce,
    pub timestamp: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserStateSnapshot {
    pub user_id: UserId,
    pub xp_state: XpState,
    pub rp_state: RpState,
    pub staking_state: StakingState,
    pub pending_balance: Fixed9,
    pub current_rate: Fixed9,
    pub active_effects: Vec<EffectSourceId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub total_users: u64,
    pub phase: Phase,
    pub base_rate: Fixed9,
}
