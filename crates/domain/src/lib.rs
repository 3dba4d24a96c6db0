// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared vocabulary for the Finova reward engine core: value types, the
//! external interface contracts consumed and exposed across component
//! boundaries, and the error taxonomy. This crate carries no behavior of
//! its own — every operation lives in the component crate that owns the
//! corresponding piece of state.

pub mod effects;
pub mod error;
pub mod event;
pub mod ids;
pub mod interface;
pub mod ledger;
pub mod network;
pub mod rp;
pub mod staking;
pub mod time;
pub mod user;
pub mod xp;

pub use effects::{Axis, EffectEntry, EffectLifecycle, MultiplierVec, StackingClass};
pub use error::{EngineError, ErrorKind, IngestError, Inconsistency, PolicyViolation, TransientFailure};
pub use event::{ActivityType, DeviceInfo, Engagement, EventRecord, Platform};
pub use ids::{ClaimNonce, EffectSourceId, ExternalEventId, UserId};
pub use interface::NetworkSnapshot;
pub use ledger::{ClaimStatus, LastClaim, LedgerState};
pub use network::{NetworkState, Phase};
pub use rp::{RpState, RpTier};
pub use staking::{StakeLifecycle, StakingState, StakingTier};
pub use time::Timestamp;
pub use user::{UserAggregate, UserLifecycle};
pub use xp::{LevelUp, XpState};
