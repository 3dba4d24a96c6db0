// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Finova Reward Engine Core: orchestrates event intake, scoring,
//! XP/RP/staking/effects, mining-rate calculation, the accrual ledger,
//! and reward propagation behind a per-user single-writer discipline.
//!
//! This crate owns no economic logic itself — every computation lives
//! in one of the component crates (`xp_engine`, `referral_engine`,
//! `staking`, `effects`, `mining_rate`, `ledger`, `scoring`,
//! `event_intake`, `network_phase`, `propagator`, `fixed_point`). What
//! lives here is the wiring: the [`store::UserStore`] that gives each
//! user a single writer, the indexed side tables that don't belong on
//! [`domain::UserAggregate`] itself, and [`engine::RewardEngine`], which
//! sequences calls into the component crates for each external event.

pub mod claims;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod network;
pub mod rate;
pub mod store;

pub use claims::{ClaimSink, InMemoryClaimSink};
pub use config::{ComponentConfigs, RewardConfig};
pub use engine::{IngestedActivity, RewardEngine};
pub use error::{EngineError, Result};
pub use network::NetworkCell;
pub use store::{InMemoryUserStore, UserStore};
