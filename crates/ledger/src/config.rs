// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use domain::Phase;
use fixed_point::Fixed9;

pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Daily-yield ceilings and the rolling-window length they apply over.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerConfig {
    /// `$FIN` ceiling on gains within any rolling window, by phase
    /// (Finizen..Stability). Excess is forfeited, not deferred.
    pub daily_caps: [Fixed9; 4],
    pub daily_window_secs: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            daily_caps: [
                Fixed9::from_ratio(48, 10),
                Fixed9::from_ratio(18, 10),
                Fixed9::from_ratio(72, 100),
                Fixed9::from_ratio(24, 100),
            ],
            daily_window_secs: SECONDS_PER_DAY,
        }
    }
}

impl LedgerConfig {
    pub fn daily_cap(&self, phase: Phase) -> Fixed9 {
        self.daily_caps[phase.as_u8() as usize - 1]
    }
}
