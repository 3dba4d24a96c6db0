// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event Intake & Deduplicator: normalizes inbound social activity,
//! rejects replays and implausible timestamps, and assigns the
//! monotonic per-user sequence number every downstream component relies
//! on for ordering.
//!
//! Duplicates are idempotent no-ops: a replayed `(user_id, external_id)`
//! pair returns the originally accepted record rather than erroring, so
//! retrying an ingest call after an uncertain network response is
//! always safe.

mod config;
mod index;

pub use config::IntakeConfig;
pub use index::{IngestOutcome, IntakeIndex};
