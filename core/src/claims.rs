// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where settled claims go once `RewardEngine::claim` has moved a
//! user's `pending_balance` into `cumulative_earned`. A durable
//! deployment would hand these to a payout queue; this crate only
//! defines the trait and an in-memory reference sink for tests.

use parking_lot::Mutex;

use domain::interface::RewardClaimed;

pub trait ClaimSink: Send + Sync {
    fn record(&self, claim: RewardClaimed);
}

/// Collects every settled claim in arrival order, for assertions in
/// tests and local CLI runs.
#[derive(Default)]
pub struct InMemoryClaimSink {
    claims: Mutex<Vec<RewardClaimed>>,
}

impl InMemoryClaimSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<RewardClaimed> {
        self.claims.lock().clone()
    }
}

impl ClaimSink for InMemoryClaimSink {
    fn record(&self, claim: RewardClaimed) {
        self.claims.lock().push(claim);
    }
}
