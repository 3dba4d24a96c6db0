// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Abuse Scorer and Quality Scorer. Both are pure functions over a bounded
//! feature window: no state is owned here, so the same input window always
//! yields the same score, deterministically.

pub mod abuse;
pub mod quality;

pub use abuse::{AbuseFeatureWindow, AbuseScorer};
pub use quality::{QualityFeatures, QualityScorer};
