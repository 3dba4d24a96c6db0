// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use domain::UserId;
use fixed_point::Fixed9;
use referral_engine::RpConfig;

use crate::graph::Ancestor;

/// One ancestor's share of a propagated credit, still pending the
/// caller's activity/suspension check.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PendingCredit {
    pub user_id: UserId,
    pub depth: u8,
    pub amount: Fixed9,
}

/// Computes each ancestor's share of `base_value` per the L1/L2/L3 split,
/// for every ancestor the graph walk actually reached (a halted walk
/// simply yields fewer credits; no ancestor is ever skipped over).
pub fn compute_credits(base_value: Fixed9, ancestors: &[Ancestor], config: &RpConfig) -> Vec<PendingCredit> {
    ancestors
        .iter()
        .filter_map(|a| {
            config.split_for_depth(a.depth).map(|split| PendingCredit {
                user_id: a.user_id,
                depth: a.depth,
                amount: base_value.saturating_mul(split),
            })
        })
        .collect()
}
