// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use domain::{IngestError, Inconsistency, PolicyViolation, TransientFailure, UserId};
use thiserror::Error;

/// The orchestrator's top-level error type. Wraps the four-kind
/// taxonomy the component crates raise (`domain::error`) plus the two
/// failure modes that only make sense at the orchestration layer:
/// an unknown user id, and a malformed on-disk configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Policy(#[from] PolicyViolation),
    #[error(transparent)]
    Transient(#[from] TransientFailure),
    #[error(transparent)]
    Inconsistent(#[from] Inconsistency),
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("staking operation failed: {0}")]
    Staking(#[from] staking::Error),
    #[error("network phase configuration invalid: {0}")]
    NetworkPhase(#[from] network_phase::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
