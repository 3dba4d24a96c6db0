// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Network mining phase, `1..4`, thresholded by total registered users.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    Finizen = 1,
    Growth = 2,
    Maturity = 3,
    Stability = 4,
}

impl Phase {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Finizen => Some(Phase::Growth),
            Phase::Growth => Some(Phase::Maturity),
            Phase::Maturity => Some(Phase::Stability),
            Phase::Stability => None,
        }
    }
}

/// Global network state, read-mostly and updated by the Phase Oracle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkState {
    pub total_users: u64,
    pub phase: Phase,
    pub phase_entry_timestamps: [Option<Timestamp>; 4],
}

impl Default for NetworkState {
    fn default() -> Self {
        NetworkState {
            total_users: 0,
            phase: Phase::Finizen,
            phase_entry_timestamps: [None; 4],
        }
    }
}

impl NetworkState {
    pub fn phase_entry(&self, phase: Phase) -> Option<Timestamp> {
        self.phase_entry_timestamps[phase.as_u8() as usize - 1]
    }
}
