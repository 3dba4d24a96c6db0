// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::effects::EffectEntry;
use crate::ids::UserId;
use crate::ledger::LedgerState;
use crate::rp::RpState;
use crate::staking::StakingState;
use crate::time::Timestamp;
use crate::xp::XpState;

/// User lifecycle: `Created -> KYC-Pending -> KYC-Verified ->
/// (Suspended | Active) -> Closed`. Only `Active` users accrue mining.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserLifecycle {
    Created,
    KycPending,
    KycVerified,
    Active,
    Suspended,
    Closed,
}

impl UserLifecycle {
    pub fn accrues_mining(self) -> bool {
        matches!(self, UserLifecycle::Active)
    }
}

/// The single consistency unit of the engine: all mutation of a given
/// user's state is strictly serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserAggregate {
    pub user_id: UserId,
    pub lifecycle: UserLifecycle,
    pub kyc_verified: bool,
    pub created_at: Timestamp,
    pub mining_phase_entry: Timestamp,

    pub ledger: LedgerState,

    pub streak_counter: u32,
    pub last_activity: Option<Timestamp>,

    pub suspected_bot: bool,
    pub consecutive_low_human_score_events: u32,

    pub xp: XpState,
    pub rp: RpState,
    pub staking: StakingState,
    pub effects: Vec<EffectEntry>,

    /// Monotonic per-user sequence counter assigned by the Intake
    /// component; the next event accepted for this user receives this
    /// value and it is then incremented.
    pub next_sequence: u64,
}

impl UserAggregate {
    pub fn new(user_id: UserId, created_at: Timestamp, utc_offset_minutes: i32) -> Self {
        UserAggregate {
            user_id,
            lifecycle: UserLifecycle::Created,
            kyc_verified: false,
            created_at,
            mining_phase_entry: created_at,
            ledger: LedgerState::new(created_at),
            streak_counter: 0,
            last_activity: None,
            suspected_bot: false,
            consecutive_low_human_score_events: 0,
            xp: XpState::new(utc_offset_minutes),
            rp: RpState::default(),
            staking: StakingState::default(),
            effects: Vec::new(),
            next_sequence: 0,
        }
    }
}
