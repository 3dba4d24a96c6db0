// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::ids::EffectSourceId;
use crate::time::Timestamp;
use fixed_point::Fixed9;

/// The axis a multiplier vector component applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Mining,
    Xp,
    Rp,
}

/// A multiplier vector over the three axes an effect can influence.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiplierVec {
    pub mining: Fixed9,
    pub xp: Fixed9,
    pub rp: Fixed9,
}

impl MultiplierVec {
    pub const IDENTITY: MultiplierVec = MultiplierVec {
        mining: Fixed9::ONE,
        xp: Fixed9::ONE,
        rp: Fixed9::ONE,
    };

    pub fn get(&self, axis: Axis) -> Fixed9 {
        match axis {
            Axis::Mining => self.mining,
            Axis::Xp => self.xp,
            Axis::Rp => self.rp,
        }
    }

    /// Component-wise product, saturating rather than overflowing.
    pub fn saturating_mul(&self, rhs: &MultiplierVec) -> MultiplierVec {
        MultiplierVec {
            mining: self.mining.saturating_mul(rhs.mining),
            xp: self.xp.saturating_mul(rhs.xp),
            rp: self.rp.saturating_mul(rhs.rp),
        }
    }
}

/// A stacking class groups effects that compete for the same slot; only
/// one entry per class is active at a time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackingClass {
    MiningCard,
    XpCard,
    RpCard,
    Guild,
    Special,
}

/// Effect lifecycle: `Pending -> Active(now>=start) ->
/// Expired(now>=expiry)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectLifecycle {
    Pending,
    Active,
    Expired,
}

/// A time-bounded multiplier ("card").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    pub source: EffectSourceId,
    pub class: StackingClass,
    pub multiplier: MultiplierVec,
    pub start: Timestamp,
    pub expiry: Timestamp,
}

impl EffectEntry {
    pub fn lifecycle_at(&self, now: Timestamp) -> EffectLifecycle {
        if now < self.start {
            EffectLifecycle::Pending
        } else if now >= self.expiry {
            EffectLifecycle::Expired
        } else {
            EffectLifecycle::Active
        }
    }

    /// The product of the multiplier vector's three components, used to
    /// compare candidate entries for the same stacking class under the
    /// replace-if-stronger policy.
    pub fn strength(&self) -> Fixed9 {
        self.multiplier
            .mining
            .saturating_mul(self.multiplier.xp)
            .saturating_mul(self.multiplier.rp)
    }
}
