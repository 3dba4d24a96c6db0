// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::time::Timestamp;
use fixed_point::Fixed9;

/// Referral tier, a pure function of `total_rp`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RpTier {
    Explorer,
    Connector,
    Influencer,
    Leader,
    Ambassador,
}

impl RpTier {
    pub fn as_str(self) -> &'static str {
        match self {
            RpTier::Explorer => "Explorer",
            RpTier::Connector => "Connector",
            RpTier::Influencer => "Influencer",
            RpTier::Leader => "Leader",
            RpTier::Ambassador => "Ambassador",
        }
    }
}

/// Referral-graph state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpState {
    /// Pre-regression accumulation of `direct_rp_contribution +
    /// indirect_rp_contribution + quality_bonus`. Kept separate from
    /// `total_rp` because the network-regression factor is recomputed
    /// fresh on every update rather than compounded, so the un-regressed
    /// sum must survive across updates.
    pub raw_rp: Fixed9,
    /// `raw_rp` with the network-regression factor applied; the value
    /// `tier` is a pure function of.
    pub total_rp: Fixed9,
    pub tier: RpTier,
    /// Immutable once set; assigned only at account creation.
    pub direct_referrer: Option<UserId>,
    pub direct_referral_count: u32,
    pub indirect_referral_count: u32,
    pub great_indirect_referral_count: u32,
    /// Referees with at least one qualifying event in the trailing 30 days.
    pub active_referral_count: u32,
    pub network_quality_score: Fixed9,
    pub last_activity: Option<Timestamp>,
}

impl Default for RpState {
    fn default() -> Self {
        RpState {
            raw_rp: Fixed9::ZERO,
            total_rp: Fixed9::ZERO,
            tier: RpTier::Explorer,
            direct_referrer: None,
            direct_referral_count: 0,
            indirect_referral_count: 0,
            great_indirect_referral_count: 0,
            active_referral_count: 0,
            network_quality_score: Fixed9::ONE,
            last_activity: None,
        }
    }
}
