// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thin CLI for local operation of the reward engine core: run the
//! background sweep loop, replay a recorded event log for deterministic
//! reproduction, inspect one user's state, or force a single sweep pass.
//!
//! This binary is not a daemon and owns no persistence of its own — it
//! exists for local inspection and for replaying event logs against a
//! fresh in-memory engine, per `SPEC_FULL.md`'s non-goals around
//! clustering and a durable store.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use domain::interface::{ClaimRequested, EffectGranted, KycStatusChanged, SocialActivity, StakeOperation, UserCreated};
use domain::{Timestamp, UserId};
use finova_reward_core::{claims::InMemoryClaimSink, config::RewardConfig, engine::RewardEngine, store::InMemoryUserStore};

#[derive(Parser)]
#[command(name = "finova-reward-core", about = "Finova Reward Engine Core: local operation CLI")]
struct Cli {
    /// Path to a TOML config file. Falls back to `RewardConfig::default()`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the background sweep loop and run until interrupted.
    Run,
    /// Replay a newline-delimited JSON event log against a fresh engine,
    /// printing each accepted event's outcome. Deterministic: the same
    /// log always produces the same final state.
    Replay {
        /// Path to the event log, one JSON `ReplayEvent` per line.
        path: PathBuf,
    },
    /// Print one user's current state as JSON.
    Inspect {
        user_id: u64,
        /// The timestamp (unix seconds) to evaluate active effects at.
        #[arg(long)]
        now: i64,
    },
    /// Force a single sweep pass across every registered user.
    Sweep {
        #[arg(long)]
        now: i64,
    },
}

/// One line of a replay log: an external event paired with the
/// timestamp it should be applied at. Kept CLI-local rather than part of
/// `domain::interface`, since wire format for a durable event log is an
/// operational concern outside this core's scope.
#[derive(serde::Deserialize)]
#[serde(tag = "kind")]
enum ReplayEvent {
    UserCreated { now: i64, event: UserCreated },
    KycStatusChanged { now: i64, event: KycStatusChanged },
    SocialActivity { now: i64, event: SocialActivity },
    StakeOperation { now: i64, event: StakeOperation },
    EffectGranted { now: i64, event: EffectGranted },
    ClaimRequested { now: i64, event: ClaimRequested },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RewardConfig> {
    match path {
        Some(path) => RewardConfig::load_from_path(path).context("loading config"),
        None => Ok(RewardConfig::default()),
    }
}

fn build_engine(config: RewardConfig) -> anyhow::Result<RewardEngine> {
    RewardEngine::new(config, Arc::new(InMemoryUserStore::new()), Arc::new(InMemoryClaimSink::new()))
        .context("constructing reward engine")
}

fn now_from_system_clock() -> Timestamp {
    let unix_secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock is after the unix epoch")
        .as_secs() as i64;
    Timestamp::from_unix_secs(unix_secs)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Run => run(config).await,
        Command::Replay { path } => replay(config, &path),
        Command::Inspect { user_id, now } => inspect(config, UserId(user_id), Timestamp::from_unix_secs(now)),
        Command::Sweep { now } => sweep(config, Timestamp::from_unix_secs(now)),
    }
}

async fn run(config: RewardConfig) -> anyhow::Result<()> {
    let sweep_interval = std::time::Duration::from_secs(config.sweep_interval_secs);
    let engine = Arc::new(build_engine(config)?);
    tracing::info!("reward engine core started, sweeping every {sweep_interval:?}");

    let mut ticker = tokio::time::interval(sweep_interval);
    loop {
        ticker.tick().await;
        let now = now_from_system_clock();
        let engine = Arc::clone(&engine);
        tokio::task::spawn_blocking(move || engine.sweep(now)).await?;
    }
}

fn replay(config: RewardConfig, path: &std::path::Path) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    let file = std::fs::File::open(path).with_context(|| format!("opening replay log {}", path.display()))?;
    let reader = std::io::BufReader::new(file);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {} of {}", line_no + 1, path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: ReplayEvent =
            serde_json::from_str(&line).with_context(|| format!("parsing line {} of {}", line_no + 1, path.display()))?;
        apply_replay_event(&engine, parsed)?;
    }

    tracing::info!("replay complete");
    Ok(())
}

fn apply_replay_event(engine: &RewardEngine, event: ReplayEvent) -> anyhow::Result<()> {
    match event {
        ReplayEvent::UserCreated { event, .. } => {
            engine.on_user_created(event)?;
        }
        ReplayEvent::KycStatusChanged { now, event } => {
            engine.on_kyc_status_changed(event, Timestamp::from_unix_secs(now))?;
        }
        ReplayEvent::SocialActivity { now, event } => {
            let outcome = engine.ingest_social_activity(event, Timestamp::from_unix_secs(now))?;
            if let Some(outcome) = outcome {
                tracing::info!(xp_gained = %outcome.xp.xp_gained, human_score = %outcome.human_score, "activity ingested");
            }
        }
        ReplayEvent::StakeOperation { now, event } => {
            engine.stake_operation(event, Timestamp::from_unix_secs(now))?;
        }
        ReplayEvent::EffectGranted { now, event } => {
            engine.grant_effect(event, Timestamp::from_unix_secs(now))?;
        }
        ReplayEvent::ClaimRequested { now, event } => {
            let claimed = engine.claim(event, Timestamp::from_unix_secs(now))?;
            tracing::info!(amount = %claimed.amount, cumulative = %claimed.cumulative_earned, "reward claimed");
        }
    }
    Ok(())
}

fn inspect(config: RewardConfig, user_id: UserId, now: Timestamp) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    match engine.snapshot_user(user_id, now) {
        Some(snapshot) => {
            let json = serde_json::to_string_pretty(&snapshot).context("serializing user snapshot")?;
            println!("{json}");
            Ok(())
        }
        None => anyhow::bail!("unknown user {user_id}"),
    }
}

fn sweep(config: RewardConfig, now: Timestamp) -> anyhow::Result<()> {
    let engine = build_engine(config)?;
    engine.sweep(now);
    tracing::info!("sweep complete");
    Ok(())
}
