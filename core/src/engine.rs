// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `RewardEngine`: wires the eleven component crates together behind the
//! per-user single-writer discipline described in `crate::store`.
//!
//! Every public method takes `now: Timestamp` explicitly rather than
//! reading the system clock, so a sequence of calls against a fresh
//! engine is fully deterministic and replayable.

use std::sync::Arc;

use parking_lot::Mutex;

use domain::interface::{
    ClaimRequested, EffectGranted, KycStatusChanged, RewardClaimed, SocialActivity, StakeOperation, StakeOperationKind,
    UserCreated, UserStateSnapshot,
};
use domain::{Engagement, Timestamp, UserId};
use event_intake::{IngestOutcome, IntakeIndex};
use fixed_point::Fixed9;
use propagator::{Ancestor, ReferralGraphIndex};
use scoring::{AbuseScorer, QualityFeatures, QualityScorer};
use xp_engine::{XpEngine, XpOutcome};

use crate::claims::ClaimSink;
use crate::config::{ComponentConfigs, RewardConfig};
use crate::error::EngineError;
use crate::history::HistoryIndex;
use crate::network::NetworkCell;
use crate::rate;
use crate::store::{self, UserStore};

/// Share of `quality_score` above `1.0` credited back to the originating
/// user's own `raw_rp` as a self quality bonus, per `spec.md` §4.E's
/// `total_RP = direct + indirect + quality_bonus` term. See `DESIGN.md`
/// for why `0.1` was chosen.
const SELF_QUALITY_BONUS_RATE: Fixed9 = Fixed9::from_raw(100_000_000);

/// Result of a successfully accepted (non-duplicate) social activity
/// event, returned to the caller for logging/telemetry. `None` from
/// [`RewardEngine::ingest_social_activity`] means the event was a
/// duplicate or was rejected; rejections surface as an `Err` instead.
#[derive(Clone, Debug)]
pub struct IngestedActivity {
    pub record: domain::EventRecord,
    pub xp: XpOutcome,
    pub human_score: Fixed9,
    pub quality_score: Fixed9,
    pub suspected_bot: bool,
}

/// The orchestrator. Holds the component configs, the per-user store,
/// the network-wide phase oracle, and the indexed side tables
/// (`ReferralGraphIndex`, `IntakeIndex`, `HistoryIndex`) that are keyed
/// by event/graph volume rather than by user.
pub struct RewardEngine {
    config: RewardConfig,
    components: ComponentConfigs,
    store: Arc<dyn UserStore>,
    network: NetworkCell,
    graph: Mutex<ReferralGraphIndex>,
    intake: Mutex<IntakeIndex>,
    history: Mutex<HistoryIndex>,
    claims: Arc<dyn ClaimSink>,
}

impl RewardEngine {
    pub fn new(config: RewardConfig, store: Arc<dyn UserStore>, claims: Arc<dyn ClaimSink>) -> Result<Self, EngineError> {
        let components = config.split()?;
        let network = NetworkCell::new(components.phase.clone())?;
        Ok(RewardEngine {
            config,
            components,
            store,
            network,
            graph: Mutex::new(ReferralGraphIndex::new()),
            intake: Mutex::new(IntakeIndex::new()),
            history: Mutex::new(HistoryIndex::new()),
            claims,
        })
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Registers a new user and, if a referrer is named, links the
    /// referral edge and credits the upline's referral counters.
    ///
    /// A `referrer_id` that names a user not yet present in the store is
    /// logged and silently skipped rather than treated as an error,
    /// mirroring the propagator's own "halt at the first missing
    /// ancestor" philosophy: a referral that cannot be resolved simply
    /// contributes nothing, rather than blocking account creation.
    #[tracing::instrument(skip(self), fields(user = %event.user_id))]
    pub fn on_user_created(&self, event: UserCreated) -> Result<(), EngineError> {
        store::create_user(self.store.as_ref(), event.user_id, event.created_at, self.config.default_utc_offset_minutes)?;
        self.store.with_user_mut(event.user_id, |user| {
            user.lifecycle = domain::UserLifecycle::KycPending;
            Ok(())
        })?;

        if let Some(transition) = self.network.on_user_created(event.created_at) {
            tracing::info!(
                target: "network_phase",
                old_phase = ?transition.old_phase,
                new_phase = ?transition.new_phase,
                "network phase advanced"
            );
        }

        let Some(referrer_id) = event.referrer_id else {
            return Ok(());
        };
        if !self.store.contains(referrer_id) {
            tracing::warn!(user = %event.user_id, referrer = %referrer_id, "referrer not found at user creation; skipping referral edge");
            return Ok(());
        }
        referral_engine::validate_referrer_assignment(event.user_id, referrer_id, None)?;

        let ancestors: Vec<Ancestor> = {
            let mut graph = self.graph.lock();
            graph.add_edge(event.user_id, referrer_id);
            graph.ancestors(event.user_id).to_vec()
        };
        self.history.lock().record_referral_added(referrer_id, event.created_at);

        let mut ids = vec![event.user_id];
        ids.extend(ancestors.iter().map(|a| a.user_id));
        ids.sort();
        ids.dedup();

        self.store.with_many_users_mut(&ids, |users| {
            let referee_idx = users
                .iter()
                .position(|u| u.user_id == event.user_id)
                .expect("originating user is always in ids");
            referral_engine::RpAccount::new(&self.components.rp, &mut users[referee_idx].rp).set_direct_referrer(referrer_id);

            for ancestor in &ancestors {
                let Some(idx) = users.iter().position(|u| u.user_id == ancestor.user_id) else {
                    continue;
                };
                if matches!(users[idx].lifecycle, domain::UserLifecycle::Suspended | domain::UserLifecycle::Closed) {
                    break;
                }
                let mut account = referral_engine::RpAccount::new(&self.components.rp, &mut users[idx].rp);
                match ancestor.depth {
                    1 => account.increment_direct(),
                    2 => account.increment_indirect(),
                    3 => account.increment_great_indirect(),
                    _ => {}
                }
            }
            Ok(())
        })?;

        Ok(())
    }

    /// `verified` transitions: `KycPending -> Active` on `true`,
    /// `Active -> Suspended` on `false`. Any other lifecycle is left
    /// alone; a `Closed` or already-`Suspended` account does not get
    /// reopened by a stray KYC event.
    #[tracing::instrument(skip(self), fields(user = %event.user_id))]
    pub fn on_kyc_status_changed(&self, event: KycStatusChanged, now: Timestamp) -> Result<(), EngineError> {
        let network = self.network.snapshot();
        self.store.with_user_mut(event.user_id, |user| {
            rate::accrue_to_now(user, &network, &self.components, now);
            user.kyc_verified = event.verified;
            user.lifecycle = match (user.lifecycle, event.verified) {
                (domain::UserLifecycle::KycPending, true) => domain::UserLifecycle::Active,
                (domain::UserLifecycle::Active, false) => domain::UserLifecycle::Suspended,
                (domain::UserLifecycle::Suspended, true) => domain::UserLifecycle::Active,
                (other, _) => other,
            };
            Ok(())
        })
    }

    /// The full ingest pipeline for one inbound social activity event:
    /// accrue, dedup/validate, assemble the abuse feature window, score,
    /// apply XP, then (outside the originator's own lock) propagate RP
    /// credit to up to three ancestors atomically.
    ///
    /// Returns `Ok(None)` for a duplicate event; a malformed, stale, or
    /// too-far-future event surfaces as `Err`.
    #[tracing::instrument(skip(self, activity), fields(user = %activity.user_id))]
    pub fn ingest_social_activity(&self, activity: SocialActivity, now: Timestamp) -> Result<Option<IngestedActivity>, EngineError> {
        let user_id = activity.user_id;
        let network = self.network.snapshot();
        let device_hash = activity.device_info.device_hash.clone();
        let network_hash = activity.device_info.network_hash.clone();
        let content_fingerprint = activity.content_fingerprint.clone();
        let engagement = activity.engagement;
        let platform = activity.platform;
        let activity_type = activity.activity_type;

        let ingested = self.store.with_user_mut(user_id, |user| {
            rate::accrue_to_now(user, &network, &self.components, now);
            let last_accrual = user.ledger.last_accrual;

            let outcome = self
                .intake
                .lock()
                .ingest(&self.components.intake, activity, last_accrual, &mut user.next_sequence, now);
            let record = match outcome {
                IngestOutcome::Accepted(record) => record,
                IngestOutcome::Duplicate(_) => return Ok(None),
                IngestOutcome::Rejected(err) => return Err(EngineError::from(err)),
            };

            let window = self
                .history
                .lock()
                .observe(user_id, &device_hash, &network_hash, content_fingerprint.as_deref(), now);
            let human_score = AbuseScorer.score(&window);
            let escalated = AbuseScorer::update_escalation(&mut user.consecutive_low_human_score_events, human_score);
            if escalated && !user.suspected_bot {
                tracing::warn!(target: "abuse", user = %user_id, "user flagged as suspected bot after consecutive low-score events");
            }
            user.suspected_bot = user.suspected_bot || escalated;

            let quality_score = if activity_type.is_content_bearing() {
                let features = QualityFeatures {
                    originality: window.content_originality,
                    platform_relevance: Fixed9::ONE,
                    brand_safety: Fixed9::ONE,
                    engagement_velocity: engagement_velocity_signal(&engagement),
                };
                QualityScorer.score(&features)
            } else {
                Fixed9::ONE
            };

            let effective = AbuseScorer::effective_multiplier(human_score, user.suspected_bot);
            let attenuated_quality = quality_score.saturating_mul(effective);

            let xp = XpEngine.apply_activity(&mut user.xp, activity_type, platform, attenuated_quality, now);
            referral_engine::RpAccount::new(&self.components.rp, &mut user.rp).record_activity(now);
            user.last_activity = Some(now);

            Ok(Some(IngestedActivity {
                record,
                xp,
                human_score,
                quality_score,
                suspected_bot: user.suspected_bot,
            }))
        })?;

        let Some(ingested) = ingested else {
            return Ok(None);
        };

        if !ingested.xp.xp_gained.is_zero() {
            self.propagate_rp_credit(user_id, ingested.xp.xp_gained, ingested.quality_score, &network)?;
        }

        Ok(Some(ingested))
    }

    /// Credits the originator's own quality bonus and the up-to-3-hop
    /// ancestor chain's referral share of `base_value`, all under one
    /// `with_many_users_mut` call so the whole propagation commits
    /// atomically or not at all.
    ///
    /// Halts (does not skip) at the first ancestor found `Suspended` or
    /// `Closed`: a severed upline cannot keep collecting credit, but the
    /// halt must not silently reach past it to a still-eligible deeper
    /// ancestor, since that would misrepresent which chain actually
    /// earned the referral.
    fn propagate_rp_credit(
        &self,
        user_id: UserId,
        base_value: Fixed9,
        quality_score: Fixed9,
        network: &domain::NetworkSnapshot,
    ) -> Result<(), EngineError> {
        let ancestors: Vec<Ancestor> = self.graph.lock().ancestors(user_id).to_vec();
        let credits = propagator::compute_credits(base_value, &ancestors, &self.components.rp);

        let mut ids = vec![user_id];
        ids.extend(credits.iter().map(|c| c.user_id));
        ids.sort();
        ids.dedup();

        self.store.with_many_users_mut(&ids, |users| {
            let quality_bonus = quality_score
                .saturating_sub(Fixed9::ONE)
                .max(Fixed9::ZERO)
                .saturating_mul(SELF_QUALITY_BONUS_RATE);
            if !quality_bonus.is_zero() {
                let idx = users.iter().position(|u| u.user_id == user_id).expect("originator is always in ids");
                referral_engine::RpAccount::new(&self.components.rp, &mut users[idx].rp).credit_raw(quality_bonus);
            }

            for credit in &credits {
                let Some(idx) = users.iter().position(|u| u.user_id == credit.user_id) else {
                    continue;
                };
                if matches!(users[idx].lifecycle, domain::UserLifecycle::Suspended | domain::UserLifecycle::Closed) {
                    break;
                }
                referral_engine::RpAccount::new(&self.components.rp, &mut users[idx].rp).credit_raw(credit.amount);
            }

            for user in users.iter_mut() {
                let quality = user.rp.network_quality_score;
                referral_engine::RpAccount::new(&self.components.rp, &mut user.rp).recompute_total_rp(network.total_users, quality);
            }
            Ok(())
        })
    }

    /// Settles a user's `pending_balance` into `cumulative_earned`,
    /// idempotent on `claim_nonce`. Forces an accrual step first so the
    /// claimed amount reflects the rate up to `now`, not just up to the
    /// last event that happened to touch this user.
    #[tracing::instrument(skip(self), fields(user = %request.user_id))]
    pub fn claim(&self, request: ClaimRequested, now: Timestamp) -> Result<RewardClaimed, EngineError> {
        let network = self.network.snapshot();
        let claimed = self.store.with_user_mut(request.user_id, |user| {
            rate::accrue_to_now(user, &network, &self.components, now);
            let (amount, _status) = ledger::LedgerAccount::new(&self.components.ledger, &mut user.ledger).claim(request.claim_nonce.clone(), now);
            Ok(RewardClaimed {
                user_id: request.user_id,
                amount,
                cumulative_earned: user.ledger.cumulative_earned,
                claim_nonce: request.claim_nonce.clone(),
                timestamp: now,
            })
        })?;
        self.claims.record(claimed.clone());
        Ok(claimed)
    }

    /// Applies a stake/unstake operation. Forces accrual first since a
    /// changed stake changes the mining rate going forward.
    #[tracing::instrument(skip(self), fields(user = %op.user_id))]
    pub fn stake_operation(&self, op: StakeOperation, now: Timestamp) -> Result<(), EngineError> {
        let network = self.network.snapshot();
        self.store.with_user_mut(op.user_id, |user| {
            rate::accrue_to_now(user, &network, &self.components, now);
            let mut account = staking::StakingAccount::new(&self.components.staking, &mut user.staking);
            match op.kind {
                StakeOperationKind::Stake => account.stake(op.delta, now)?,
                StakeOperationKind::Unstake => account.unstake(op.delta, now)?,
            }
            Ok(())
        })
    }

    /// Grants (or attempts to upgrade) an effect card. Forces accrual
    /// first since the new effect changes the mining rate going forward.
    /// Returns whether the registry actually changed, per the
    /// replace-if-stronger stacking policy.
    #[tracing::instrument(skip(self), fields(user = %grant.user_id))]
    pub fn grant_effect(&self, grant: EffectGranted, now: Timestamp) -> Result<bool, EngineError> {
        let network = self.network.snapshot();
        self.store.with_user_mut(grant.user_id, |user| {
            rate::accrue_to_now(user, &network, &self.components, now);
            let changed =
                effects::EffectRegistry::new(&self.components.effects, &mut user.effects).add_effect(grant.source.clone(), grant.class, grant.multiplier_vec(), now, grant.expiry);
            Ok(changed)
        })
    }

    /// A point-in-time read of one user's public state, for inspection
    /// tooling. Does not mutate the ledger; the displayed `current_rate`
    /// and `pending_balance` reflect whatever was last accrued, not a
    /// projection forward to `now`.
    pub fn snapshot_user(&self, user_id: UserId, now: Timestamp) -> Option<UserStateSnapshot> {
        let mut user = self.store.snapshot(user_id)?;
        let network = self.network.snapshot();
        let rate = rate::current_rate(&user, &network, &self.components).rate;
        let active_effects = effects::EffectRegistry::new(&self.components.effects, &mut user.effects).active_sources(now);
        Some(UserStateSnapshot {
            user_id,
            xp_state: user.xp,
            rp_state: user.rp,
            staking_state: user.staking,
            pending_balance: user.ledger.pending_balance,
            current_rate: rate,
            active_effects,
        })
    }

    /// Runs the full background sweep over every registered user: forces
    /// an accrual step, purges expired effects, refreshes staking
    /// loyalty, and finalizes any stake whose cooldown has matured.
    /// Meant to be called on `config().sweep_interval_secs` cadence.
    pub fn sweep(&self, now: Timestamp) {
        let network = self.network.snapshot();
        for user_id in self.store.all_user_ids() {
            let result = self.store.with_user_mut(user_id, |user| {
                rate::accrue_to_now(user, &network, &self.components, now);
                effects::EffectRegistry::new(&self.components.effects, &mut user.effects).purge_expired(now);
                let mut staking_account = staking::StakingAccount::new(&self.components.staking, &mut user.staking);
                staking_account.refresh_loyalty(now);
                if user.staking.lifecycle == domain::StakeLifecycle::Cooldown {
                    let _ = staking_account.finalize_unstake(now);
                }
                Ok(())
            });
            if let Err(err) = result {
                tracing::error!(target: "inconsistency", user = %user_id, error = %err, "sweep failed for user");
            }
        }
        self.sweep_active_referrals(now);
    }

    /// Recomputes `active_referral_count` for every user from a snapshot
    /// of their direct referees' last-activity timestamps. Deferred to
    /// the periodic sweep rather than recomputed on every single event,
    /// since it costs `O(direct referrals)` per user.
    fn sweep_active_referrals(&self, now: Timestamp) {
        let user_ids = self.store.all_user_ids();
        let graph = self.graph.lock();
        let mut work = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            let referees = graph.direct_referrals_of(user_id).to_vec();
            if !referees.is_empty() {
                work.push((user_id, referees));
            }
        }
        drop(graph);

        for (user_id, referees) in work {
            let last_activity: Vec<Option<Timestamp>> = referees
                .iter()
                .map(|referee| self.store.snapshot(*referee).and_then(|u| u.last_activity))
                .collect();
            let _ = self.store.with_user_mut(user_id, |user| {
                referral_engine::RpAccount::new(&self.components.rp, &mut user.rp).recompute_active_referrals(now, &last_activity);
                Ok(())
            });
        }
    }
}

/// Maps raw engagement counts onto the `[0, 1]` engagement-velocity
/// signal the Quality Scorer expects: likes/comments/shares weighted by
/// how strongly each implies a human paid attention, relative to the
/// event's view count. An event with no recorded views is treated as
/// maximally engaging rather than divided by zero, since a missing view
/// count usually means the platform doesn't report one rather than that
/// nobody watched.
fn engagement_velocity_signal(engagement: &Engagement) -> Fixed9 {
    if engagement.views == 0 {
        return Fixed9::ONE;
    }
    let weighted = engagement
        .likes
        .saturating_add(engagement.comments.saturating_mul(3))
        .saturating_add(engagement.shares.saturating_mul(5));
    Fixed9::from_ratio(weighted.min(engagement.views) as i64, engagement.views as i64)
}
