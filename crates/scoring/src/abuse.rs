// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use fixed_point::Fixed9;

/// The bounded feature window the Abuse Scorer reads: inter-event
/// intervals, daily activity pattern, device/network consistency,
/// content-originality, referral-graph shape. The caller (event intake /
/// orchestrator) is responsible for assembling this from recent history;
/// this crate performs no I/O and holds no state.
#[derive(Clone, Debug, PartialEq)]
pub struct AbuseFeatureWindow {
    /// Seconds between consecutive events in the trailing window, oldest
    /// first. Empty for a user's first event.
    pub inter_event_gaps_secs: Vec<u64>,
    /// Count of events per hour-of-day bucket (0..24) over the trailing
    /// window, used to detect inhumanly regular activity patterns.
    pub hourly_activity_counts: [u32; 24],
    /// Distinct device fingerprints seen in the trailing window.
    pub distinct_devices: u32,
    /// Distinct network fingerprints seen in the trailing window.
    pub distinct_networks: u32,
    /// `[0, 1]` input signal: how often this device/network pairing
    /// recurs versus looking synthetic/rotated; `1.0` is maximally
    /// consistent (human-like).
    pub device_network_consistency: Fixed9,
    /// `[0, 1]` upstream originality signal for the event's content, or
    /// `1.0` for non-content events.
    pub content_originality: Fixed9,
    /// Direct referrals added by this user in the trailing 24h, used to
    /// penalize extreme fan-out (star-burst Sybil shape).
    pub referrals_added_trailing_24h: u32,
}

impl Default for AbuseFeatureWindow {
    fn default() -> Self {
        AbuseFeatureWindow {
            inter_event_gaps_secs: Vec::new(),
            hourly_activity_counts: [0; 24],
            distinct_devices: 1,
            distinct_networks: 1,
            device_network_consistency: Fixed9::ONE,
            content_originality: Fixed9::ONE,
            referrals_added_trailing_24h: 0,
        }
    }
}

/// Threshold below which a per-event `human_score` triggers reward
/// attenuation.
pub const ATTENUATION_THRESHOLD: Fixed9 = Fixed9::from_raw(300_000_000);

/// Floor multiplier applied across all reward outputs once a user is
/// flagged `suspected_bot`.
pub const SUSPECTED_BOT_FLOOR: Fixed9 = Fixed9::from_raw(100_000_000);

/// Consecutive sub-threshold events required to flip `suspected_bot`.
/// See `DESIGN.md` for the chosen default.
pub const BOT_ESCALATION_THRESHOLD: u32 = 5;

#[derive(Clone, Copy, Debug, Default)]
pub struct AbuseScorer;

impl AbuseScorer {
    /// Produces `human_score ∈ [0, 1]`.
    pub fn score(&self, window: &AbuseFeatureWindow) -> Fixed9 {
        let gap_regularity = self.gap_regularity_score(&window.inter_event_gaps_secs);
        let daily_pattern = self.daily_pattern_score(&window.hourly_activity_counts);
        let device_consistency = Self::device_consistency_score(window);
        let originality = window.content_originality.clamp(Fixed9::ZERO, Fixed9::ONE);
        let fan_out = self.fan_out_score(window.referrals_added_trailing_24h);

        // Equal-weighted average of five independent sub-signals, each
        // already normalized to [0, 1].
        let sum = gap_regularity
            .saturating_add(daily_pattern)
            .saturating_add(device_consistency)
            .saturating_add(originality)
            .saturating_add(fan_out);
        sum.checked_div_int(5).unwrap_or(Fixed9::ZERO).clamp(Fixed9::ZERO, Fixed9::ONE)
    }

    /// Humans space activity irregularly; a bot driven by a fixed-interval
    /// scheduler produces near-zero variance in gap lengths. We score the
    /// coefficient of variation of the gaps and map low variance to a low
    /// score.
    fn gap_regularity_score(&self, gaps: &[u64]) -> Fixed9 {
        if gaps.len() < 2 {
            return Fixed9::ONE;
        }
        let n = gaps.len() as i64;
        let mean = Fixed9::from_ratio(gaps.iter().sum::<u64>() as i64, n);
        if mean.is_zero() {
            return Fixed9::ZERO;
        }
        let mut variance = Fixed9::ZERO;
        for g in gaps {
            let diff = Fixed9::from_integer(*g as i64).saturating_sub(mean);
            variance = variance.saturating_add(diff.saturating_mul(diff));
        }
        variance = variance.checked_div_int(n).unwrap_or(Fixed9::ZERO);
        let std_dev = isqrt_fixed(variance);
        let coefficient_of_variation = std_dev.checked_div(mean).unwrap_or(Fixed9::ZERO);
        // CV of 0 (perfectly regular) -> score 0; CV >= 1 -> score 1.
        coefficient_of_variation.clamp(Fixed9::ZERO, Fixed9::ONE)
    }

    /// Human activity spreads across many hours of the day; a bot
    /// concentrated in a narrow band of hours scores lower.
    fn daily_pattern_score(&self, hourly: &[u32; 24]) -> Fixed9 {
        let total: u32 = hourly.iter().sum();
        if total == 0 {
            return Fixed9::ONE;
        }
        let max_bucket = *hourly.iter().max().unwrap_or(&0);
        let concentration = Fixed9::from_ratio(max_bucket as i64, total as i64);
        Fixed9::ONE.saturating_sub(concentration).clamp(Fixed9::ZERO, Fixed9::ONE)
    }

    fn device_consistency_score(window: &AbuseFeatureWindow) -> Fixed9 {
        let base = window.device_network_consistency.clamp(Fixed9::ZERO, Fixed9::ONE);
        // Excess distinct devices/networks beyond the first each shave a
        // fixed amount, modeling device-cycling abuse.
        let excess = (window.distinct_devices.saturating_sub(1) + window.distinct_networks.saturating_sub(1)) as i64;
        let penalty = Fixed9::from_ratio(excess, 10);
        base.saturating_sub(penalty).clamp(Fixed9::ZERO, Fixed9::ONE)
    }

    fn fan_out_score(&self, referrals_added_trailing_24h: u32) -> Fixed9 {
        // Beyond 10 referrals added in a single day, every additional
        // referral weighs the fan-out score down; a human rarely refers
        // double digits of new accounts in one day.
        const FREE_ALLOWANCE: u32 = 10;
        if referrals_added_trailing_24h <= FREE_ALLOWANCE {
            return Fixed9::ONE;
        }
        let excess = referrals_added_trailing_24h - FREE_ALLOWANCE;
        Fixed9::ONE
            .saturating_sub(Fixed9::from_ratio(excess as i64, 20))
            .clamp(Fixed9::ZERO, Fixed9::ONE)
    }

    /// Attenuates rewards by `human_score` once it drops below
    /// [`ATTENUATION_THRESHOLD`]; otherwise no attenuation. A
    /// `suspected_bot` flag overrides this with the harder
    /// [`SUSPECTED_BOT_FLOOR`].
    pub fn effective_multiplier(human_score: Fixed9, suspected_bot: bool) -> Fixed9 {
        if suspected_bot {
            return SUSPECTED_BOT_FLOOR;
        }
        if human_score < ATTENUATION_THRESHOLD {
            human_score.max(Fixed9::ZERO)
        } else {
            Fixed9::ONE
        }
    }

    /// Updates the consecutive-low-score escalation counter and returns
    /// whether `suspected_bot` should now be set. `suspected_bot` flips
    /// after [`BOT_ESCALATION_THRESHOLD`] consecutive sub-threshold
    /// scores, and never auto-clears (an operator-driven path, out of
    /// scope for this core, would reset it).
    pub fn update_escalation(consecutive_low_score_events: &mut u32, human_score: Fixed9) -> bool {
        if human_score < ATTENUATION_THRESHOLD {
            *consecutive_low_score_events = consecutive_low_score_events.saturating_add(1);
        } else {
            *consecutive_low_score_events = 0;
        }
        *consecutive_low_score_events >= BOT_ESCALATION_THRESHOLD
    }
}

/// Integer-ish square root for a non-negative [`Fixed9`], via Newton's
/// method; a handful of iterations is enough for the precision this
/// scorer needs and the result is never fed back into economic
/// calculations directly.
fn isqrt_fixed(x: Fixed9) -> Fixed9 {
    if x.is_zero() || x.is_negative() {
        return Fixed9::ZERO;
    }
    let mut guess = x.max(Fixed9::ONE);
    for _ in 0..30 {
        let next = guess
            .saturating_add(x.checked_div(guess).unwrap_or(Fixed9::ZERO))
            .checked_div_int(2)
            .unwrap_or(guess);
        if next == guess {
            break;
        }
        guess = next;
    }
    guess
}
