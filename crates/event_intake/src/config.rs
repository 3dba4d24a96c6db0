// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Grace windows bounding how stale or how far in the future an
/// incoming event's timestamp may be before it is rejected outright.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntakeConfig {
    /// An event older than the user's last-accrual timestamp by more
    /// than this many seconds is rejected as stale.
    pub stale_grace_secs: i64,
    /// An event timestamped more than this many seconds ahead of `now`
    /// is rejected as implausible.
    pub future_grace_secs: i64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        IntakeConfig {
            stale_grace_secs: 300,
            future_grace_secs: 120,
        }
    }
}
