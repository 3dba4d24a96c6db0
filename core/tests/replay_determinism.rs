// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replaying the same event log against two independently constructed
//! engines must produce identical terminal state for every user,
//! per `spec.md` §8's determinism law. This is the one property the
//! per-crate unit tests cannot exercise: it needs a full event
//! sequence run twice end to end.

use std::sync::Arc;

use domain::interface::{ClaimRequested, EffectGranted, KycStatusChanged, SocialActivity, StakeOperation, StakeOperationKind, UserCreated};
use domain::{ActivityType, ClaimNonce, DeviceInfo, EffectSourceId, Engagement, ExternalEventId, Platform, StackingClass, Timestamp, UserId};
use finova_reward_core::{claims::InMemoryClaimSink, config::RewardConfig, engine::RewardEngine, store::InMemoryUserStore};

fn fresh_engine() -> RewardEngine {
    RewardEngine::new(
        RewardConfig::default(),
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryClaimSink::new()),
    )
    .unwrap()
}

fn activity(user: UserId, external_id: &str, ts: i64) -> SocialActivity {
    SocialActivity {
        user_id: user,
        external_id: ExternalEventId(external_id.to_string()),
        platform: Platform::TikTok,
        activity_type: ActivityType::VideoContent,
        content_fingerprint: Some(format!("fp-{external_id}")),
        engagement: Engagement {
            likes: 120,
            comments: 14,
            shares: 6,
            views: 900,
        },
        device_info: DeviceInfo {
            device_hash: format!("device-{user}"),
            network_hash: format!("network-{user}"),
        },
        timestamp: Timestamp::from_unix_secs(ts),
    }
}

/// Applies the same mixed sequence of every external event kind this
/// core consumes (user creation with a referral edge, KYC verification,
/// repeated content activity, a stake, an effect grant, and a claim)
/// against a fresh engine, returning the built engine for inspection.
fn replay_fixture() -> RewardEngine {
    let engine = fresh_engine();

    engine
        .on_user_created(UserCreated {
            user_id: UserId(1),
            referrer_id: None,
            created_at: Timestamp::from_unix_secs(0),
        })
        .unwrap();
    engine
        .on_user_created(UserCreated {
            user_id: UserId(2),
            referrer_id: Some(UserId(1)),
            created_at: Timestamp::from_unix_secs(10),
        })
        .unwrap();

    engine
        .on_kyc_status_changed(
            KycStatusChanged {
                user_id: UserId(1),
                verified: true,
            },
            Timestamp::from_unix_secs(20),
        )
        .unwrap();
    engine
        .on_kyc_status_changed(
            KycStatusChanged {
                user_id: UserId(2),
                verified: true,
            },
            Timestamp::from_unix_secs(20),
        )
        .unwrap();

    for (i, ts) in [100_i64, 3_700, 7_300].into_iter().enumerate() {
        engine.ingest_social_activity(activity(UserId(2), &format!("e{i}"), ts), Timestamp::from_unix_secs(ts)).unwrap();
    }

    engine
        .stake_operation(
            StakeOperation {
                user_id: UserId(1),
                delta: fixed_point::Fixed9::from_integer(500),
                kind: StakeOperationKind::Stake,
                timestamp: Timestamp::from_unix_secs(7_400),
            },
            Timestamp::from_unix_secs(7_400),
        )
        .unwrap();

    engine
        .grant_effect(
            EffectGranted {
                user_id: UserId(2),
                source: EffectSourceId("card-xp-double".to_string()),
                class: StackingClass::XpCard,
                mining_mult: fixed_point::Fixed9::ONE,
                xp_mult: fixed_point::Fixed9::from_integer(2),
                rp_mult: fixed_point::Fixed9::ONE,
                expiry: Timestamp::from_unix_secs(20_000),
            },
            Timestamp::from_unix_secs(7_500),
        )
        .unwrap();

    engine
        .claim(
            ClaimRequested {
                user_id: UserId(1),
                claim_nonce: ClaimNonce("claim-1".to_string()),
            },
            Timestamp::from_unix_secs(10_000),
        )
        .unwrap();

    engine.sweep(Timestamp::from_unix_secs(10_050));

    engine
}

/// `spec.md` §8: "Replaying the full event log against empty state
/// produces the same terminal state as the original run."
#[test]
fn replaying_the_same_log_twice_yields_identical_terminal_state() {
    let first = replay_fixture();
    let second = replay_fixture();

    for user_id in [UserId(1), UserId(2)] {
        let a = first.store().snapshot(user_id).unwrap();
        let b = second.store().snapshot(user_id).unwrap();
        assert_eq!(a, b, "user {user_id} diverged between independent replays");
    }
}

/// A claim nonce already settled by the first replay must not settle a
/// second time if the same log (including the `ClaimRequested` line) is
/// ever reapplied against a store that already has that nonce recorded.
#[test]
fn replay_claim_nonce_remains_idempotent_within_a_single_run() {
    let engine = fresh_engine();
    engine
        .on_user_created(UserCreated {
            user_id: UserId(1),
            referrer_id: None,
            created_at: Timestamp::from_unix_secs(0),
        })
        .unwrap();
    engine
        .on_kyc_status_changed(
            KycStatusChanged {
                user_id: UserId(1),
                verified: true,
            },
            Timestamp::from_unix_secs(0),
        )
        .unwrap();

    let nonce = ClaimNonce("dup-nonce".to_string());
    let first = engine
        .claim(
            ClaimRequested {
                user_id: UserId(1),
                claim_nonce: nonce.clone(),
            },
            Timestamp::from_unix_secs(3_600),
        )
        .unwrap();
    let second = engine
        .claim(
            ClaimRequested {
                user_id: UserId(1),
                claim_nonce: nonce,
            },
            Timestamp::from_unix_secs(3_700),
        )
        .unwrap();

    assert_eq!(first.amount, second.amount);
    assert_eq!(first.cumulative_earned, second.cumulative_earned);
}
