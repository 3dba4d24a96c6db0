// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Accrual & Claim Ledger: turns the time-varying mining rate into a
//! concrete, claimable `$FIN` balance.
//!
//! Integration is piecewise-constant — the caller re-derives the rate
//! from [`mining_rate::compute_rate`] on every state change that could
//! affect it and calls [`LedgerAccount::accrue`] with that rate over the
//! interval since the last accrual, before the state change itself
//! takes effect. This crate only ever sees a rate already computed
//! elsewhere; it has no opinion on how that rate was derived.

mod account;
mod config;

pub use account::{AccrualOutcome, LedgerAccount};
pub use config::LedgerConfig;
