// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Errors produced while parsing or combining fixed-point values.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("fixed-point overflow")]
    Overflow,
    #[error("invalid decimal literal: {0}")]
    Parse(String),
}
