// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exercises the one async surface this core owns: the `Run` command's
//! tick-then-`spawn_blocking`-sweep loop in `src/main.rs`. The binary's
//! `run()` itself isn't reachable from an integration test (it never
//! returns while interrupted and lives in the bin crate, not the lib),
//! so this drives the same `tokio::time::interval` /
//! `tokio::task::spawn_blocking` pattern directly against one sweep
//! cycle and asserts the sweep actually advanced background state.

use std::sync::Arc;
use std::time::Duration;

use domain::interface::{EffectGranted, KycStatusChanged, UserCreated};
use domain::{EffectSourceId, StackingClass, Timestamp, UserId};
use finova_reward_core::{claims::InMemoryClaimSink, config::RewardConfig, engine::RewardEngine, store::InMemoryUserStore};
use fixed_point::Fixed9;

fn engine_with_expiring_effect() -> RewardEngine {
    let engine = RewardEngine::new(
        RewardConfig::default(),
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryClaimSink::new()),
    )
    .unwrap();

    let now = Timestamp::from_unix_secs(0);
    engine
        .on_user_created(UserCreated {
            user_id: UserId(1),
            referrer_id: None,
            created_at: now,
        })
        .unwrap();
    engine
        .on_kyc_status_changed(KycStatusChanged { user_id: UserId(1), verified: true }, now)
        .unwrap();
    engine
        .grant_effect(
            EffectGranted {
                user_id: UserId(1),
                source: EffectSourceId("short-lived-card".to_string()),
                class: StackingClass::MiningCard,
                mining_mult: Fixed9::from_integer(2),
                xp_mult: Fixed9::ONE,
                rp_mult: Fixed9::ONE,
                expiry: Timestamp::from_unix_secs(30),
            },
            now,
        )
        .unwrap();

    engine
}

/// Mirrors `main.rs::run()`'s loop body for a single iteration: wait on
/// an interval tick, then offload the synchronous `sweep` to a blocking
/// task, exactly as the `Run` subcommand does on every real tick.
#[tokio::test]
async fn one_tick_offloads_a_sweep_that_purges_an_expired_effect() {
    let engine = Arc::new(engine_with_expiring_effect());

    let before = engine.store().snapshot(UserId(1)).unwrap();
    assert_eq!(before.effects.len(), 1, "the short-lived card should be active before the sweep");

    let mut ticker = tokio::time::interval(Duration::from_millis(5));
    ticker.tick().await; // fires immediately, as the first tick of a fresh interval always does
    ticker.tick().await; // waits out the interval once, like a real sweep cadence would

    let sweep_engine = Arc::clone(&engine);
    let now = Timestamp::from_unix_secs(60);
    tokio::task::spawn_blocking(move || sweep_engine.sweep(now)).await.unwrap();

    let after = engine.store().snapshot(UserId(1)).unwrap();
    assert!(after.effects.is_empty(), "sweep must purge the effect once its expiry has passed");
}
