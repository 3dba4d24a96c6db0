// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reward Propagator: credits a downline content-bearing event's L1/L2/L3
//! upline ancestors.
//!
//! Owns the referral graph's direct-edge index and the recomputable
//! 3-hop ancestor cache ([`ReferralGraphIndex`]); `referral_engine` owns
//! only the per-user RP accrual math the propagator calls into once it
//! has resolved which ancestors to credit. The orchestrator is
//! responsible for the transactional guarantee that all ancestor credits
//! for one event commit together or not at all, and for skipping
//! suspended or inactive ancestors before applying a [`PendingCredit`].

mod graph;
mod split;

pub use graph::{Ancestor, ReferralGraphIndex};
pub use split::{compute_credits, PendingCredit};
