// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A bounded per-user recent-event side table that assembles the Abuse
//! Scorer's [`AbuseFeatureWindow`] at ingest time.
//!
//! `scoring::AbuseFeatureWindow` is deliberately stateless and performs
//! no I/O of its own; something upstream has to remember the last
//! handful of events to build the window from. This follows the same
//! pattern as `event_intake::IntakeIndex` and
//! `propagator::ReferralGraphIndex`: an indexed table owned by the
//! orchestrator, sized by event/referral volume rather than by user
//! count, and kept out of `UserAggregate` itself.

use std::collections::{HashMap, VecDeque};

use domain::{Timestamp, UserId};
use fixed_point::Fixed9;
use scoring::AbuseFeatureWindow;

/// How many recent events are retained per user for feature assembly.
const HISTORY_CAPACITY: usize = 50;
/// Trailing window used for the referral fan-out feature.
const FAN_OUT_WINDOW_SECS: i64 = 86_400;

#[derive(Clone, Debug)]
struct EventSample {
    timestamp: Timestamp,
    device_hash: String,
    network_hash: String,
}

#[derive(Default)]
struct UserHistory {
    samples: VecDeque<EventSample>,
    referral_adds: VecDeque<Timestamp>,
    seen_fingerprints: std::collections::HashSet<String>,
}

/// Side table the orchestrator keeps to assemble each event's abuse
/// feature window before scoring it, and to record referral additions
/// for the fan-out feature.
#[derive(Default)]
pub struct HistoryIndex {
    users: HashMap<UserId, UserHistory>,
}

impl HistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `referrer` gained a new direct referral at `now`,
    /// for the trailing-24h fan-out feature of `referrer`'s own future
    /// events.
    pub fn record_referral_added(&mut self, referrer: UserId, now: Timestamp) {
        let history = self.users.entry(referrer).or_default();
        history.referral_adds.push_back(now);
        while history.referral_adds.len() > HISTORY_CAPACITY {
            history.referral_adds.pop_front();
        }
    }

    /// Builds the feature window for an event from `user` at `now`,
    /// then folds that event into history for future calls. Must be
    /// called once per accepted event, in timestamp order per user.
    pub fn observe(
        &mut self,
        user: UserId,
        device_hash: &str,
        network_hash: &str,
        content_fingerprint: Option<&str>,
        now: Timestamp,
    ) -> AbuseFeatureWindow {
        let history = self.users.entry(user).or_default();

        let mut inter_event_gaps_secs = Vec::with_capacity(history.samples.len());
        let mut hourly_activity_counts = [0u32; 24];
        let mut devices: std::collections::HashSet<&str> = std::collections::HashSet::new();
        let mut networks: std::collections::HashSet<&str> = std::collections::HashSet::new();
        let mut prev: Option<Timestamp> = None;
        for sample in &history.samples {
            if let Some(p) = prev {
                inter_event_gaps_secs.push(p.elapsed_secs_until(sample.timestamp));
            }
            prev = Some(sample.timestamp);
            let hour = (sample.timestamp.unix_secs().rem_euclid(86_400) / 3_600) as usize;
            hourly_activity_counts[hour] += 1;
            devices.insert(sample.device_hash.as_str());
            networks.insert(sample.network_hash.as_str());
        }
        if let Some(p) = prev {
            inter_event_gaps_secs.push(p.elapsed_secs_until(now));
        }
        devices.insert(device_hash);
        networks.insert(network_hash);

        let device_network_consistency = if history
            .samples
            .iter()
            .all(|s| s.device_hash == device_hash && s.network_hash == network_hash)
        {
            Fixed9::ONE
        } else {
            Fixed9::from_ratio(1, 2)
        };

        let content_originality = match content_fingerprint {
            Some(fp) if history.seen_fingerprints.contains(fp) => Fixed9::ZERO,
            _ => Fixed9::ONE,
        };

        let referrals_added_trailing_24h = history
            .referral_adds
            .iter()
            .filter(|t| t.elapsed_secs_until(now) as i64 <= FAN_OUT_WINDOW_SECS)
            .count() as u32;

        let window = AbuseFeatureWindow {
            inter_event_gaps_secs,
            hourly_activity_counts,
            distinct_devices: devices.len() as u32,
            distinct_networks: networks.len() as u32,
            device_network_consistency,
            content_originality,
            referrals_added_trailing_24h,
        };

        if let Some(fp) = content_fingerprint {
            history.seen_fingerprints.insert(fp.to_string());
        }
        history.samples.push_back(EventSample {
            timestamp: now,
            device_hash: device_hash.to_string(),
            network_hash: network_hash.to_string(),
        });
        while history.samples.len() > HISTORY_CAPACITY {
            history.samples.pop_front();
        }

        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_event_has_no_gaps_and_perfect_consistency() {
        let mut index = HistoryIndex::new();
        let window = index.observe(UserId(1), "d1", "n1", Some("fp1"), Timestamp::from_unix_secs(0));
        assert!(window.inter_event_gaps_secs.is_empty());
        assert_eq!(window.device_network_consistency, Fixed9::ONE);
        assert_eq!(window.distinct_devices, 1);
    }

    #[test]
    fn repeated_device_keeps_consistency_high() {
        let mut index = HistoryIndex::new();
        index.observe(UserId(1), "d1", "n1", None, Timestamp::from_unix_secs(0));
        let window = index.observe(UserId(1), "d1", "n1", None, Timestamp::from_unix_secs(60));
        assert_eq!(window.inter_event_gaps_secs, vec![60]);
        assert_eq!(window.device_network_consistency, Fixed9::ONE);
    }

    #[test]
    fn device_rotation_lowers_consistency() {
        let mut index = HistoryIndex::new();
        index.observe(UserId(1), "d1", "n1", None, Timestamp::from_unix_secs(0));
        let window = index.observe(UserId(1), "d2", "n2", None, Timestamp::from_unix_secs(60));
        assert!(window.device_network_consistency < Fixed9::ONE);
        assert_eq!(window.distinct_devices, 2);
    }

    #[test]
    fn repeated_content_fingerprint_is_not_original() {
        let mut index = HistoryIndex::new();
        index.observe(UserId(1), "d1", "n1", Some("dup"), Timestamp::from_unix_secs(0));
        let window = index.observe(UserId(1), "d1", "n1", Some("dup"), Timestamp::from_unix_secs(60));
        assert_eq!(window.content_originality, Fixed9::ZERO);
    }

    #[test]
    fn referral_adds_outside_trailing_window_are_excluded() {
        let mut index = HistoryIndex::new();
        index.record_referral_added(UserId(1), Timestamp::from_unix_secs(0));
        let window = index.observe(UserId(1), "d1", "n1", None, Timestamp::from_unix_secs(2 * 86_400));
        assert_eq!(window.referrals_added_trailing_24h, 0);
    }

    #[test]
    fn history_is_bounded_to_capacity() {
        let mut index = HistoryIndex::new();
        for i in 0..(HISTORY_CAPACITY as i64 + 10) {
            index.observe(UserId(1), "d1", "n1", None, Timestamp::from_unix_secs(i * 60));
        }
        let history = index.users.get(&UserId(1)).unwrap();
        assert_eq!(history.samples.len(), HISTORY_CAPACITY);
    }
}
