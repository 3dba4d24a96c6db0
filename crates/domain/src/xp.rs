// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::ActivityType;
use crate::time::Timestamp;

/// Experience-point state.
///
/// `total_xp` is unsigned and wide enough for `10^12`; `u128` gives
/// enormous headroom above that with no practical overflow path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XpState {
    pub total_xp: u128,
    pub current_level: u32,
    pub streak_days: u32,
    /// Local calendar day of the last event that counted toward the
    /// streak (`None` before the user's first activity).
    pub last_streak_day: Option<NaiveDate>,
    /// Fixed UTC offset used to compute the user's local day boundary;
    /// see `Timestamp::local_date`.
    pub utc_offset_minutes: i32,
    /// Per-activity-type counters for the current local day, reset at the
    /// day boundary.
    pub daily_counts: HashMap<ActivityType, u32>,
    pub daily_counts_day: Option<NaiveDate>,
    pub last_activity: Option<Timestamp>,
}

impl Default for XpState {
    fn default() -> Self {
        XpState {
            total_xp: 0,
            current_level: 1,
            streak_days: 0,
            last_streak_day: None,
            utc_offset_minutes: 0,
            daily_counts: HashMap::new(),
            daily_counts_day: None,
            last_activity: None,
        }
    }
}

impl XpState {
    pub fn new(utc_offset_minutes: i32) -> Self {
        XpState {
            utc_offset_minutes,
            ..Default::default()
        }
    }
}

/// Emitted when an XP change crosses a level threshold. Consumed by the
/// Mining Rate Calculator, which reads `current_level` afresh rather than
/// reacting to the payload directly, but the signal still drives an
/// immediate ledger accrual step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
}
