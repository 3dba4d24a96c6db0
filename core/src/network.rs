// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single-writer global resource for network-wide state: the
//! registered-user count and the phase it implies. Every per-user write
//! path reads a [`domain::NetworkSnapshot`] through here; only
//! [`NetworkCell::on_user_created`] ever mutates it.

use parking_lot::Mutex;

use domain::{NetworkSnapshot, Timestamp};
use network_phase::{PhaseConfig, PhaseOracle, PhaseTransition};

use crate::error::EngineError;

pub struct NetworkCell {
    oracle: Mutex<PhaseOracle>,
}

impl NetworkCell {
    pub fn new(config: PhaseConfig) -> Result<Self, EngineError> {
        Ok(NetworkCell {
            oracle: Mutex::new(PhaseOracle::new(config)?),
        })
    }

    pub fn on_user_created(&self, now: Timestamp) -> Option<PhaseTransition> {
        self.oracle.lock().on_user_created(now)
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.oracle.lock().snapshot()
    }
}
