// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A point in time, stored as whole seconds since the Unix epoch.
///
/// The engine never reads the system clock directly inside pure
/// calculation code: every operation that needs "now" receives it as an
/// explicit parameter rather than calling out to `Utc::now()`, which is
/// what makes event-log replay deterministic.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    pub fn from_unix_secs(secs: i64) -> Self {
        Timestamp(secs)
    }

    pub fn unix_secs(self) -> i64 {
        self.0
    }

    pub fn saturating_add_secs(self, secs: i64) -> Self {
        Timestamp(self.0.saturating_add(secs))
    }

    /// Seconds elapsed from `self` to `other`; zero if `other` precedes
    /// `self` (callers integrate rates over `[last, now]` and must never
    /// walk time backwards).
    pub fn elapsed_secs_until(self, other: Timestamp) -> u64 {
        other.0.saturating_sub(self.0).max(0) as u64
    }

    fn to_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.0, 0).single().unwrap_or_else(Utc::now)
    }

    /// The user's local calendar date at this instant, given a fixed UTC
    /// offset in minutes. The engine tracks a fixed offset per user rather
    /// than a full IANA time zone database entry (see `DESIGN.md`); this
    /// is sufficient for day boundaries defined by the user's local
    /// timezone rather than UTC, without a tz-database dependency.
    pub fn local_date(self, utc_offset_minutes: i32) -> NaiveDate {
        let shifted = self.to_datetime() + Duration::minutes(utc_offset_minutes as i64);
        shifted.date_naive()
    }

    /// Whether `self` and `other` fall on the same local calendar day.
    pub fn same_local_day(self, other: Timestamp, utc_offset_minutes: i32) -> bool {
        self.local_date(utc_offset_minutes) == other.local_date(utc_offset_minutes)
    }

    /// Whether `other` is exactly the local calendar day after `self`
    /// (used to decide whether an activity continues or breaks a streak).
    pub fn is_next_local_day(self, other: Timestamp, utc_offset_minutes: i32) -> bool {
        self.local_date(utc_offset_minutes).succ_opt() == Some(other.local_date(utc_offset_minutes))
    }
}

impl std::ops::Sub for Timestamp {
    type Output = i64;
    fn sub(self, rhs: Timestamp) -> i64 {
        self.0 - rhs.0
    }
}
