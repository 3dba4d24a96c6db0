// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::ids::ClaimNonce;
use crate::time::Timestamp;
use fixed_point::Fixed9;

/// The outcome of the most recently settled claim, kept on the user
/// aggregate so a retried `ClaimRequested` carrying the same nonce can be
/// answered without re-running the transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LastClaim {
    pub nonce: ClaimNonce,
    pub amount: Fixed9,
    pub settled_at: Timestamp,
}

/// Whether a claim request settled for the first time or was recognized
/// as a retry of an already-settled one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClaimStatus {
    Settled,
    AlreadySettled,
}

/// Accrual and claim state: the time-integrated, not-yet-claimed
/// balance plus the rolling daily-cap window and claim-idempotency
/// record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Monotonically non-decreasing.
    pub cumulative_earned: Fixed9,
    /// Never negative.
    pub pending_balance: Fixed9,
    pub last_accrual: Timestamp,
    pub last_daily_reset: Timestamp,
    /// `$FIN` credited to `pending_balance` within the current rolling
    /// daily-cap window; reset alongside `last_daily_reset`.
    pub daily_accrued: Fixed9,
    pub last_claim: Option<LastClaim>,
}

impl LedgerState {
    pub fn new(now: Timestamp) -> Self {
        LedgerState {
            cumulative_earned: Fixed9::ZERO,
            pending_balance: Fixed9::ZERO,
            last_accrual: now,
            last_daily_reset: now,
            daily_accrued: Fixed9::ZERO,
            last_claim: None,
        }
    }
}
