// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::ids::{ExternalEventId, UserId};
use crate::time::Timestamp;

/// Source social platform an activity was performed on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    TikTok,
    YouTube,
    Facebook,
    X,
    Other,
}

impl Platform {
    /// Per-platform XP multiplier, one of `{1.0, 1.1, 1.2, 1.3, 1.4}`.
    pub fn base_multiplier(self) -> fixed_point::Fixed9 {
        use fixed_point::Fixed9;
        let tenths = match self {
            Platform::Instagram => 2,
            Platform::TikTok => 3,
            Platform::YouTube => 4,
            Platform::Facebook => 1,
            Platform::X => 1,
            Platform::Other => 0,
        };
        Fixed9::ONE.saturating_add(Fixed9::from_ratio(tenths, 10))
    }
}

/// The kind of social activity an event represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    TextPost,
    ImagePost,
    VideoContent,
    Comment,
    Like,
    Share,
    Follow,
    Login,
}

impl ActivityType {
    /// Whether this activity carries content worth running the Quality
    /// Scorer over.
    pub fn is_content_bearing(self) -> bool {
        matches!(
            self,
            ActivityType::TextPost | ActivityType::ImagePost | ActivityType::VideoContent | ActivityType::Comment
        )
    }
}

/// Raw engagement counters attached to a social activity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub views: u64,
}

/// Device and network fingerprint used by the Abuse Scorer's
/// device-and-network-consistency feature. Kept intentionally coarse: the
/// reward engine does not fingerprint users beyond what abuse scoring
/// needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_hash: String,
    pub network_hash: String,
}

/// A normalized, intake-assigned event record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub user_id: UserId,
    pub external_id: ExternalEventId,
    pub platform: Platform,
    pub activity_type: ActivityType,
    pub content_fingerprint: Option<String>,
    pub engagement: Engagement,
    pub device: DeviceInfo,
    pub timestamp: Timestamp,
    /// Monotonic per-user sequence number assigned by the Intake
    /// component; downstream components rely on this to process events in
    /// assignment order.
    pub sequence: u64,
}
