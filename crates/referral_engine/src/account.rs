// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use domain::{PolicyViolation, RpState, Timestamp, UserId};
use fixed_point::Fixed9;

use crate::config::RpConfig;

/// Validates a referrer assignment against the two refusal rules: a user
/// cannot refer itself, and a referrer can only be assigned once (it is
/// immutable thereafter). The referral graph is a forest by construction
/// as a result: no edge is ever rewritten, so cycles cannot arise.
pub fn validate_referrer_assignment(
    user: UserId,
    referrer: UserId,
    current_referrer: Option<UserId>,
) -> Result<(), PolicyViolation> {
    if user == referrer {
        return Err(PolicyViolation::SelfReferral(user));
    }
    if current_referrer.is_some() {
        return Err(PolicyViolation::ReferrerAlreadySet(user));
    }
    Ok(())
}

/// Stateful RP operations over a single user's [`RpState`].
pub struct RpAccount<'a> {
    config: &'a RpConfig,
    state: &'a mut RpState,
}

impl<'a> RpAccount<'a> {
    pub fn new(config: &'a RpConfig, state: &'a mut RpState) -> Self {
        RpAccount { config, state }
    }

    /// Assigns the direct referrer. Callers must first call
    /// [`validate_referrer_assignment`]; this method only performs the
    /// mutation.
    pub fn set_direct_referrer(&mut self, referrer: UserId) {
        self.state.direct_referrer = Some(referrer);
    }

    /// Credits `amount` toward this user's pre-regression RP accumulation
    /// (direct or indirect contribution from a downline event, or a
    /// quality bonus). Does not recompute `total_rp`/`tier`; call
    /// [`Self::recompute_total_rp`] once all contributions for the
    /// current transaction are applied.
    pub fn credit_raw(&mut self, amount: Fixed9) {
        self.state.raw_rp = self.state.raw_rp.saturating_add(amount);
    }

    /// `total_RP = raw_rp * exp(-network_regression_coeff * network_size *
    /// (1 - quality_score))`, then derives `tier` from the result. The
    /// regression factor is recomputed fresh from `raw_rp` rather than
    /// compounded onto the previous `total_rp`, so repeated calls with the
    /// same inputs are idempotent.
    pub fn recompute_total_rp(&mut self, total_network_size: u64, network_quality_score: Fixed9) {
        let quality = network_quality_score.clamp(Fixed9::ZERO, Fixed9::ONE);
        let deficiency = Fixed9::ONE.saturating_sub(quality);
        let exponent = self
            .config
            .network_regression_coeff
            .saturating_mul(Fixed9::from_integer(total_network_size as i64))
            .saturating_mul(deficiency);
        let regression_factor = exponent.exp_neg();
        self.state.network_quality_score = quality;
        self.state.total_rp = self.state.raw_rp.saturating_mul(regression_factor);
        self.state.tier = self.config.tier_for_total_rp(self.state.total_rp);
    }

    pub fn record_activity(&mut self, now: Timestamp) {
        self.state.last_activity = Some(now);
    }

    pub fn increment_direct(&mut self) {
        self.state.direct_referral_count = self.state.direct_referral_count.saturating_add(1);
    }

    pub fn increment_indirect(&mut self) {
        self.state.indirect_referral_count = self.state.indirect_referral_count.saturating_add(1);
    }

    pub fn increment_great_indirect(&mut self) {
        self.state.great_indirect_referral_count = self.state.great_indirect_referral_count.saturating_add(1);
    }

    /// Recomputes `active_referral_count` from a snapshot of direct
    /// referees' last-activity timestamps, per the trailing-window
    /// definition of "active": at least one qualifying event within
    /// `active_window_secs`.
    pub fn recompute_active_referrals(&mut self, now: Timestamp, referee_last_activity: &[Option<Timestamp>]) {
        let window = self.config.active_window_secs;
        let count = referee_last_activity
            .iter()
            .filter(|last| match last {
                Some(t) => t.elapsed_secs_until(now) as i64 <= window,
                None => false,
            })
            .count();
        self.state.active_referral_count = count as u32;
    }
}
