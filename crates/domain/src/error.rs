// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

use crate::ids::UserId;
use fixed_point::Fixed9;

/// Rejections raised while normalizing or deduplicating an inbound
/// event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The `(user_id, external_id)` pair was already accepted; idempotent,
    /// not a failure.
    #[error("duplicate event for {0}")]
    Duplicate(UserId),
    #[error("event for {0} is older than the last-accrual timestamp by more than the grace window")]
    Stale(UserId),
    #[error("malformed event for {user}: {reason}")]
    Malformed { user: UserId, reason: String },
    #[error("event timestamp for {0} is too far in the future")]
    TooFarInFuture(UserId),
}

/// A structurally valid request that violates a business rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("user {0} attempted to refer itself")]
    SelfReferral(UserId),
    #[error("user {0} already has a direct referrer")]
    ReferrerAlreadySet(UserId),
    #[error("insufficient stake for user {0}")]
    InsufficientStake(UserId),
    /// Partial credit applied; the residue above the cap was forfeited,
    /// not deferred.
    #[error("daily cap exceeded for {user}: credited {credited}, forfeited {forfeited}")]
    CapExceeded {
        user: UserId,
        credited: Fixed9,
        forfeited: Fixed9,
    },
    /// Zero-credit accept: features (streak, abuse signals) still update.
    #[error("user {0} is suspended")]
    SuspendedUser(UserId),
}

/// Retried with exponential backoff up to a configured ceiling; parked
/// in a dead-letter store on final failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransientFailure {
    #[error("storage unavailable")]
    StorageUnavailable,
    #[error("operation timed out")]
    Timeout,
    #[error("lock contention on user {0}")]
    Contention(UserId),
}

/// Fatal: processing of the affected aggregate halts and an operator
/// alert is raised. Never silently swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("dedup record missing for an event already reflected in state for {0}")]
    DedupRecordMissing(UserId),
    #[error("ancestor cycle detected reaching {0}")]
    AncestorCycleDetected(UserId),
    #[error("negative balance computed for {0}")]
    NegativeBalance(UserId),
}

/// The top-level error taxonomy every fallible engine operation returns,
/// discriminated by kind so callers can branch on `EngineError::kind()`
/// without downcasting through `thiserror`'s `#[from]` chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error(transparent)]
    Transient(#[from] TransientFailure),
    #[error(transparent)]
    Inconsistent(#[from] Inconsistency),
}

/// Coarse error kind, useful for metrics labeling and retry dispatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Ingest,
    Policy,
    Transient,
    Inconsistent,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Ingest(_) => ErrorKind::Ingest,
            EngineError::Policy(_) => ErrorKind::Policy,
            EngineError::Transient(_) => ErrorKind::Transient,
            EngineError::Inconsistent(_) => ErrorKind::Inconsistent,
        }
    }

    /// Whether the engine's worker loop should retry this operation.
    /// `Inconsistency` is never retried: it halts the affected aggregate.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Transient(_))
    }
}
