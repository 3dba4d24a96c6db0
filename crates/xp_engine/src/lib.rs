// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! XP Engine: applies XP gains, level transitions, and streak state.

use std::sync::OnceLock;

use domain::{ActivityType, LevelUp, Platform, Timestamp, XpState};
use fixed_point::Fixed9;

/// Levels beyond this are not reachable; the threshold table has exactly
/// this many entries. XP earned past the final level's requirement is
/// retained in `total_xp` rather than discarded, so a future table
/// extension can recompute a higher level from the same history.
pub const MAX_LEVEL: u32 = 200;

/// Per-activity-type base XP, a fixed table.
pub fn base_xp(activity: ActivityType) -> u64 {
    match activity {
        ActivityType::TextPost => 50,
        ActivityType::ImagePost => 75,
        ActivityType::VideoContent => 150,
        ActivityType::Comment => 25,
        ActivityType::Like => 5,
        ActivityType::Share => 15,
        ActivityType::Follow => 20,
        ActivityType::Login => 10,
    }
}

/// Per-`(user, activity_type)` daily cap from the XP table. The XP
/// table's cap and the Abuse Scorer's anti-bot limits differ in general;
/// the orchestrator is expected to take `min` of this value and whatever
/// abuse-side limit it configures, per `DESIGN.md`.
pub fn daily_cap(activity: ActivityType) -> Option<u32> {
    match activity {
        ActivityType::TextPost => None,
        ActivityType::ImagePost => Some(20),
        ActivityType::VideoContent => Some(10),
        ActivityType::Comment => Some(100),
        ActivityType::Like => Some(200),
        ActivityType::Share => Some(50),
        ActivityType::Follow => Some(25),
        ActivityType::Login => Some(1),
    }
}

fn level_thresholds() -> &'static [u128; MAX_LEVEL as usize] {
    static TABLE: OnceLock<[u128; MAX_LEVEL as usize]> = OnceLock::new();
    TABLE.get_or_init(|| {
        // Cumulative XP required to reach level `n+1`: sum_{l=1}^{n} l^2 * 100.
        let mut table = [0u128; MAX_LEVEL as usize];
        let mut cumulative: u128 = 0;
        for (level, slot) in table.iter_mut().enumerate() {
            let l = (level + 1) as u128;
            cumulative += l * l * 100;
            *slot = cumulative;
        }
        table
    })
}

/// Level is a pure function of total XP via the threshold table. Caps
/// at [`MAX_LEVEL`].
pub fn level_for_total_xp(total_xp: u128) -> u32 {
    let table = level_thresholds();
    match table.iter().position(|&needed| total_xp < needed) {
        Some(idx) => (idx as u32) + 1,
        None => MAX_LEVEL,
    }
}

/// `streak_bonus = min(1 + streak_days * 0.033, 3.0)`.
pub fn streak_bonus(streak_days: u32) -> Fixed9 {
    let gain = Fixed9::from_ratio(33, 1000).saturating_mul(Fixed9::from_integer(streak_days as i64));
    Fixed9::ONE.saturating_add(gain).min(Fixed9::from_integer(3))
}

/// `level_progression_factor = exp(-0.01 * current_level)`.
pub fn level_progression_factor(current_level: u32) -> Fixed9 {
    let x = Fixed9::from_ratio(1, 100).saturating_mul(Fixed9::from_integer(current_level as i64));
    x.exp_neg()
}

/// Outcome of a single `apply_activity` call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct XpOutcome {
    pub xp_gained: Fixed9,
    pub total_xp_after: u128,
    pub level_up: Option<LevelUp>,
    pub streak_after: u32,
    /// Whether the per-day cap for this activity type had already been
    /// reached, in which case `xp_gained` is zero but streak/state still
    /// updated.
    pub capped: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct XpEngine;

impl XpEngine {
    /// `apply_activity(user, activity_type, platform, quality, now) ->
    /// xp_gained`. `quality` should be `1.0` for non-content-bearing
    /// activities (the Quality Scorer only runs over content-bearing
    /// events).
    pub fn apply_activity(
        &self,
        state: &mut XpState,
        activity_type: ActivityType,
        platform: Platform,
        quality: Fixed9,
        now: Timestamp,
    ) -> XpOutcome {
        self.roll_daily_window_if_needed(state, now);
        self.update_streak(state, now);

        let today_count = *state.daily_counts.get(&activity_type).unwrap_or(&0);
        let cap = daily_cap(activity_type);
        let capped = cap.is_some_and(|c| today_count >= c);

        let xp_gained = if capped {
            Fixed9::ZERO
        } else {
            let base = Fixed9::from_integer(base_xp(activity_type) as i64);
            base.saturating_mul(platform.base_multiplier())
                .saturating_mul(quality)
                .saturating_mul(streak_bonus(state.streak_days))
                .saturating_mul(level_progression_factor(state.current_level))
        };

        *state.daily_counts.entry(activity_type).or_insert(0) += 1;

        let old_level = state.current_level;
        if !xp_gained.is_zero() {
            // xp_gained carries 9 fractional digits; total_xp accumulates
            // whole XP units, truncating any fractional remainder.
            let whole_gain = (xp_gained.raw() / fixed_point::SCALE) as u128;
            state.total_xp = state.total_xp.saturating_add(whole_gain);
        }
        state.current_level = level_for_total_xp(state.total_xp);
        state.last_activity = Some(now);

        let level_up = if state.current_level > old_level {
            Some(LevelUp {
                old_level,
                new_level: state.current_level,
            })
        } else {
            None
        };

        XpOutcome {
            xp_gained,
            total_xp_after: state.total_xp,
            level_up,
            streak_after: state.streak_days,
            capped,
        }
    }

    fn roll_daily_window_if_needed(&self, state: &mut XpState, now: Timestamp) {
        let is_new_day = match state.daily_counts_day {
            None => true,
            Some(day) => day != now.local_date(state.utc_offset_minutes),
        };
        if is_new_day {
            state.daily_counts.clear();
            state.daily_counts_day = Some(now.local_date(state.utc_offset_minutes));
        }
    }

    fn update_streak(&self, state: &mut XpState, now: Timestamp) {
        match state.last_streak_day {
            None => {
                state.streak_days = 1;
            }
            Some(last_day) => {
                if last_day == now.local_date(state.utc_offset_minutes) {
                    // Same day: streak unaffected by repeated activity.
                    return;
                }
                let is_next_day = last_day.succ_opt() == Some(now.local_date(state.utc_offset_minutes));
                if is_next_day {
                    state.streak_days = state.streak_days.saturating_add(1);
                } else {
                    state.streak_days = 1;
                }
            }
        }
        state.last_streak_day = Some(now.local_date(state.utc_offset_minutes));
    }
}
