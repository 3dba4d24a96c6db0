// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-point decimal arithmetic shared across the reward engine.
//!
//! Every economically meaningful quantity in the engine — `$FIN` balances,
//! multipliers, scores — is a [`Fixed9`]: a 9-fractional-digit fixed-point
//! number backed by `i128`. Floating point never enters the reward path,
//! so two independent replays of the same event log always settle on
//! bit-identical balances.

mod errors;
mod fixed9;

pub use errors::Error;
pub use fixed9::{Fixed9, SCALE, SCALE_EXP};
