// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use ahash::AHashMap;

use domain::interface::SocialActivity;
use domain::{EventRecord, ExternalEventId, IngestError, Timestamp, UserId};

use crate::config::IntakeConfig;

/// The result of one `ingest` call.
#[derive(Clone, Debug, PartialEq)]
pub enum IngestOutcome {
    Accepted(EventRecord),
    /// A replay of an already-accepted `(user_id, external_id)` pair;
    /// carries the original record rather than re-deriving one, so a
    /// retried ingest is a true no-op.
    Duplicate(EventRecord),
    Rejected(IngestError),
}

/// The per-user dedup side table and monotonic sequence state that back
/// `ingest`. Kept separate from `UserAggregate` itself: this is an
/// indexed relationship table ("has this external id been seen"), not
/// user-aggregate state, and it grows unboundedly with event volume
/// rather than with user count.
#[derive(Default)]
pub struct IntakeIndex {
    seen: AHashMap<(UserId, ExternalEventId), EventRecord>,
}

impl IntakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and deduplicates one inbound activity for `user_id`,
    /// whose aggregate reports `last_accrual` and whose next assignable
    /// sequence number is `*next_sequence` (incremented on acceptance).
    /// Per-user serialization is the caller's responsibility: this
    /// method assumes it is never called concurrently for the same
    /// user.
    pub fn ingest(
        &mut self,
        config: &IntakeConfig,
        activity: SocialActivity,
        last_accrual: Timestamp,
        next_sequence: &mut u64,
        now: Timestamp,
    ) -> IngestOutcome {
        let key = (activity.user_id, activity.external_id.clone());
        if let Some(existing) = self.seen.get(&key) {
            return IngestOutcome::Duplicate(existing.clone());
        }

        if activity.device_info.device_hash.is_empty() {
            return IngestOutcome::Rejected(IngestError::Malformed {
                user: activity.user_id,
                reason: "missing device fingerprint".to_string(),
            });
        }

        if activity.timestamp.unix_secs() > now.saturating_add_secs(config.future_grace_secs).unix_secs() {
            return IngestOutcome::Rejected(IngestError::TooFarInFuture(activity.user_id));
        }

        let staleness = if activity.timestamp < last_accrual {
            last_accrual - activity.timestamp
        } else {
            0
        };
        if staleness > config.stale_grace_secs {
            return IngestOutcome::Rejected(IngestError::Stale(activity.user_id));
        }

        let record = EventRecord {
            user_id: activity.user_id,
            external_id: activity.external_id,
            platform: activity.platform,
            activity_type: activity.activity_type,
            content_fingerprint: activity.content_fingerprint,
            engagement: activity.engagement,
            device: activity.device_info,
            timestamp: activity.timestamp,
            sequence: *next_sequence,
        };
        *next_sequence += 1;
        self.seen.insert(key, record.clone());

        IngestOutcome::Accepted(record)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{ActivityType, DeviceInfo, Engagement, Platform};

    fn activity(user: UserId, external_id: &str, ts: i64) -> SocialActivity {
        SocialActivity {
            user_id: user,
            external_id: ExternalEventId(external_id.to_string()),
            platform: Platform::TikTok,
            activity_type: ActivityType::VideoContent,
            content_fingerprint: Some("fp".to_string()),
            engagement: Engagement::default(),
            device_info: DeviceInfo {
                device_hash: "d1".to_string(),
                network_hash: "n1".to_string(),
            },
            timestamp: Timestamp::from_unix_secs(ts),
        }
    }

    #[test]
    fn fresh_event_is_accepted_with_assigned_sequence() {
        let config = IntakeConfig::default();
        let mut index = IntakeIndex::new();
        let mut seq = 0u64;
        let outcome = index.ingest(&config, activity(UserId(1), "e1", 100), Timestamp::from_unix_secs(0), &mut seq, Timestamp::from_unix_secs(100));
        match outcome {
            IngestOutcome::Accepted(record) => assert_eq!(record.sequence, 0),
            other => panic!("expected Accepted, got {other:?}"),
        }
        assert_eq!(seq, 1);
    }

    #[test]
    fn duplicate_external_id_is_idempotent_no_op() {
        let config = IntakeConfig::default();
        let mut index = IntakeIndex::new();
        let mut seq = 0u64;
        let first = index.ingest(&config, activity(UserId(1), "e1", 100), Timestamp::from_unix_secs(0), &mut seq, Timestamp::from_unix_secs(100));
        let second = index.ingest(&config, activity(UserId(1), "e1", 100), Timestamp::from_unix_secs(0), &mut seq, Timestamp::from_unix_secs(100));

        let IngestOutcome::Accepted(first_record) = first else { panic!("expected Accepted") };
        let IngestOutcome::Duplicate(second_record) = second else { panic!("expected Duplicate") };
        assert_eq!(first_record, second_record);
        assert_eq!(seq, 1, "sequence must not advance on a duplicate");
    }

    #[test]
    fn stale_event_beyond_grace_window_is_rejected() {
        let config = IntakeConfig::default();
        let mut index = IntakeIndex::new();
        let mut seq = 0u64;
        let outcome = index.ingest(
            &config,
            activity(UserId(1), "e1", 0),
            Timestamp::from_unix_secs(1_000),
            &mut seq,
            Timestamp::from_unix_secs(1_000),
        );
        assert!(matches!(outcome, IngestOutcome::Rejected(IngestError::Stale(_))));
    }

    #[test]
    fn event_within_stale_grace_is_accepted() {
        let config = IntakeConfig::default();
        let mut index = IntakeIndex::new();
        let mut seq = 0u64;
        let outcome = index.ingest(
            &config,
            activity(UserId(1), "e1", 900),
            Timestamp::from_unix_secs(1_000),
            &mut seq,
            Timestamp::from_unix_secs(1_000),
        );
        assert!(matches!(outcome, IngestOutcome::Accepted(_)));
    }

    #[test]
    fn event_too_far_in_future_is_rejected() {
        let config = IntakeConfig::default();
        let mut index = IntakeIndex::new();
        let mut seq = 0u64;
        let outcome = index.ingest(
            &config,
            activity(UserId(1), "e1", 10_000),
            Timestamp::from_unix_secs(0),
            &mut seq,
            Timestamp::from_unix_secs(0),
        );
        assert!(matches!(outcome, IngestOutcome::Rejected(IngestError::TooFarInFuture(_))));
    }

    #[test]
    fn missing_device_fingerprint_is_malformed() {
        let config = IntakeConfig::default();
        let mut index = IntakeIndex::new();
        let mut seq = 0u64;
        let mut bad = activity(UserId(1), "e1", 0);
        bad.device_info.device_hash.clear();
        let outcome = index.ingest(&config, bad, Timestamp::from_unix_secs(0), &mut seq, Timestamp::from_unix_secs(0));
        assert!(matches!(outcome, IngestOutcome::Rejected(IngestError::Malformed { .. })));
    }

    #[test]
    fn different_users_with_same_external_id_are_independent() {
        let config = IntakeConfig::default();
        let mut index = IntakeIndex::new();
        let mut seq_a = 0u64;
        let mut seq_b = 0u64;
        let a = index.ingest(&config, activity(UserId(1), "shared", 0), Timestamp::from_unix_secs(0), &mut seq_a, Timestamp::from_unix_secs(0));
        let b = index.ingest(&config, activity(UserId(2), "shared", 0), Timestamp::from_unix_secs(0), &mut seq_b, Timestamp::from_unix_secs(0));
        assert!(matches!(a, IngestOutcome::Accepted(_)));
        assert!(matches!(b, IngestOutcome::Accepted(_)));
    }
}
