// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RP Engine: referral-point accrual, tier transitions, and the
//! network-quality regression factor that discourages runaway network
//! concentration.
//!
//! This crate holds no graph topology of its own — it mutates a single
//! user's [`domain::RpState`] given credit amounts and a network-size
//! snapshot. The referral graph's direct edges and the 3-hop ancestor
//! cache are owned by the `propagator` crate, which calls into this one
//! to apply the resulting credits at each ancestor.

mod account;
mod config;

pub use account::{validate_referrer_assignment, RpAccount};
pub use config::RpConfig;
