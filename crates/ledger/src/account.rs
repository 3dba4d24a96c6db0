// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use domain::{ClaimNonce, ClaimStatus, LastClaim, LedgerState, Phase, Timestamp};
use fixed_point::Fixed9;

use crate::config::{LedgerConfig, SECONDS_PER_HOUR};

/// What happened during one accrual step: how much was actually credited
/// to `pending_balance` and how much was forfeited because the rolling
/// daily cap had no room left.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AccrualOutcome {
    pub credited: Fixed9,
    pub forfeited: Fixed9,
}

/// Borrows a single user's ledger-relevant state for one mutation.
/// Every mutating method here corresponds to a "suspension point" in the
/// concurrency model: callers are expected to hold that user's lock for
/// the duration of the call and to persist the result before releasing
/// it.
pub struct LedgerAccount<'a> {
    config: &'a LedgerConfig,
    state: &'a mut LedgerState,
}

impl<'a> LedgerAccount<'a> {
    pub fn new(config: &'a LedgerConfig, state: &'a mut LedgerState) -> Self {
        LedgerAccount { config, state }
    }

    /// Integrates `rate` ($FIN/hour, assumed constant since the last
    /// accrual) over `[last_accrual, now]`, clamps the gain to whatever
    /// room remains in the current rolling daily-cap window, and folds
    /// it into `pending_balance`. Always advances `last_accrual` to
    /// `now`, even when the elapsed interval credits nothing.
    ///
    /// Must be called on every state change that could affect the rate
    /// (new event, effect added/expired, stake change, level-up, daily
    /// cap reset) before that change takes effect, so users are always
    /// credited under the rate that was actually in force.
    pub fn accrue(&mut self, rate: Fixed9, now: Timestamp, phase: Phase) -> AccrualOutcome {
        self.roll_daily_window(now);

        let elapsed = self.state.last_accrual.elapsed_secs_until(now);
        let raw = rate
            .saturating_mul(Fixed9::from_integer(elapsed as i64))
            .checked_div_int(SECONDS_PER_HOUR)
            .unwrap_or(Fixed9::ZERO);

        let cap = self.config.daily_cap(phase);
        let room = cap.saturating_sub(self.state.daily_accrued).max(Fixed9::ZERO);
        let credited = raw.min(room);
        let forfeited = raw.saturating_sub(credited);

        if !forfeited.is_zero() {
            tracing::debug!(?forfeited, "daily cap reached, excess accrual forfeited");
        }

        self.state.pending_balance = self.state.pending_balance.saturating_add(credited);
        self.state.daily_accrued = self.state.daily_accrued.saturating_add(credited);
        self.state.last_accrual = now;

        AccrualOutcome { credited, forfeited }
    }

    fn roll_daily_window(&mut self, now: Timestamp) {
        if self.state.last_daily_reset.elapsed_secs_until(now) >= self.config.daily_window_secs as u64 {
            self.state.daily_accrued = Fixed9::ZERO;
            self.state.last_daily_reset = now;
        }
    }

    /// Atomically moves `pending_balance` into `cumulative_earned` and
    /// zeroes it. Idempotent per `nonce`: a retry carrying the same
    /// nonce as the most recently settled claim returns the same amount
    /// and makes no further state change.
    pub fn claim(&mut self, nonce: ClaimNonce, now: Timestamp) -> (Fixed9, ClaimStatus) {
        if let Some(last) = &self.state.last_claim {
            if last.nonce == nonce {
                return (last.amount, ClaimStatus::AlreadySettled);
            }
        }

        let amount = self.state.pending_balance;
        self.state.pending_balance = Fixed9::ZERO;
        self.state.cumulative_earned = self.state.cumulative_earned.saturating_add(amount);
        self.state.last_claim = Some(LastClaim {
            nonce,
            amount,
            settled_at: now,
        });

        (amount, ClaimStatus::Settled)
    }

    /// Whether a background sweeper should force an accrual step for
    /// this user because its last-accrual age has grown past
    /// `max_age_secs`, so idle users still see rate changes land before
    /// they next claim.
    pub fn accrual_overdue(&self, now: Timestamp, max_age_secs: i64) -> bool {
        self.state.last_accrual.elapsed_secs_until(now) >= max_age_secs as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ClaimNonce;

    fn state_at(secs: i64) -> LedgerState {
        LedgerState::new(Timestamp::from_unix_secs(secs))
    }

    #[test]
    fn accrual_integrates_constant_rate_over_elapsed_hours() {
        let config = LedgerConfig::default();
        let mut state = state_at(0);
        let mut account = LedgerAccount::new(&config, &mut state);

        let outcome = account.accrue(Fixed9::from_ratio(1, 10), Timestamp::from_unix_secs(3_600), Phase::Finizen);
        assert_eq!(outcome.credited, Fixed9::from_ratio(1, 10));
        assert_eq!(outcome.forfeited, Fixed9::ZERO);
        assert_eq!(state.pending_balance, Fixed9::from_ratio(1, 10));
        assert_eq!(state.last_accrual, Timestamp::from_unix_secs(3_600));
    }

    #[test]
    fn daily_cap_forfeits_excess_without_deferring() {
        let config = LedgerConfig::default();
        let mut state = state_at(0);
        {
            let mut account = LedgerAccount::new(&config, &mut state);
            // Rate high enough that 1 hour alone exceeds the Finizen daily cap of 4.8.
            account.accrue(Fixed9::from_integer(10), Timestamp::from_unix_secs(3_600), Phase::Finizen);
        }
        assert_eq!(state.pending_balance, Fixed9::from_ratio(48, 10));
        assert_eq!(state.daily_accrued, Fixed9::from_ratio(48, 10));

        let mut account = LedgerAccount::new(&config, &mut state);
        let outcome = account.accrue(Fixed9::from_integer(10), Timestamp::from_unix_secs(7_200), Phase::Finizen);
        assert_eq!(outcome.credited, Fixed9::ZERO);
        assert!(outcome.forfeited > Fixed9::ZERO);
    }

    #[test]
    fn daily_window_resets_after_rolling_period() {
        let config = LedgerConfig::default();
        let mut state = state_at(0);
        state.daily_accrued = config.daily_cap(Phase::Finizen);
        let mut account = LedgerAccount::new(&config, &mut state);

        let outcome = account.accrue(Fixed9::from_ratio(1, 10), Timestamp::from_unix_secs(86_400 + 3_600), Phase::Finizen);
        assert_eq!(outcome.credited, Fixed9::from_ratio(1, 10));
        assert_eq!(outcome.forfeited, Fixed9::ZERO);
    }

    #[test]
    fn claim_moves_pending_into_cumulative_and_zeroes_pending() {
        let config = LedgerConfig::default();
        let mut state = state_at(0);
        state.pending_balance = Fixed9::from_integer(5);
        let mut account = LedgerAccount::new(&config, &mut state);

        let (amount, status) = account.claim(ClaimNonce("n1".into()), Timestamp::from_unix_secs(10));
        assert_eq!(amount, Fixed9::from_integer(5));
        assert_eq!(status, ClaimStatus::Settled);
        assert_eq!(state.pending_balance, Fixed9::ZERO);
        assert_eq!(state.cumulative_earned, Fixed9::from_integer(5));
    }

    #[test]
    fn repeated_nonce_is_idempotent() {
        let config = LedgerConfig::default();
        let mut state = state_at(0);
        state.pending_balance = Fixed9::from_integer(5);
        let mut account = LedgerAccount::new(&config, &mut state);

        let first = account.claim(ClaimNonce("n1".into()), Timestamp::from_unix_secs(10));
        let second = account.claim(ClaimNonce("n1".into()), Timestamp::from_unix_secs(20));

        assert_eq!(first.0, second.0);
        assert_eq!(second.1, ClaimStatus::AlreadySettled);
        assert_eq!(state.cumulative_earned, Fixed9::from_integer(5));
        assert_eq!(state.pending_balance, Fixed9::ZERO);
    }

    #[test]
    fn different_nonce_settles_a_new_claim() {
        let config = LedgerConfig::default();
        let mut state = state_at(0);
        state.pending_balance = Fixed9::from_integer(5);
        let mut account = LedgerAccount::new(&config, &mut state);
        account.claim(ClaimNonce("n1".into()), Timestamp::from_unix_secs(10));

        state.pending_balance = Fixed9::from_integer(3);
        let mut account = LedgerAccount::new(&config, &mut state);
        let (amount, status) = account.claim(ClaimNonce("n2".into()), Timestamp::from_unix_secs(20));
        assert_eq!(amount, Fixed9::from_integer(3));
        assert_eq!(status, ClaimStatus::Settled);
        assert_eq!(state.cumulative_earned, Fixed9::from_integer(8));
    }

    #[test]
    fn accrual_overdue_respects_threshold() {
        let config = LedgerConfig::default();
        let mut state = state_at(0);
        let account = LedgerAccount::new(&config, &mut state);
        assert!(!account.accrual_overdue(Timestamp::from_unix_secs(30), 60));
        assert!(account.accrual_overdue(Timestamp::from_unix_secs(120), 60));
    }
}
