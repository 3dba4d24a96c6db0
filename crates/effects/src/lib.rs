// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Effect Registry: time-bounded multiplier ("card") tracking with
//! stacking rules.
//!
//! Operates over the `Vec<EffectEntry>` carried on a [`UserAggregate`];
//! this crate owns no storage of its own, matching the rest of the
//! engine's indexed-side-tables-owned-by-their-component design. The
//! effect lifecycle `Pending -> Active(now>=start) -> Expired(now>=expiry)`
//! is implemented by [`domain::EffectEntry::lifecycle_at`]; this crate
//! adds the stacking and purge policy around it.

use domain::{Axis, EffectEntry, MultiplierVec, StackingClass, Timestamp};
use fixed_point::Fixed9;

/// The per-axis multiplier ceiling; default `10.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectConfig {
    pub ceiling_per_axis: Fixed9,
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig {
            ceiling_per_axis: Fixed9::from_integer(10),
        }
    }
}

/// Borrowed view over one user's active effects.
pub struct EffectRegistry<'a> {
    config: &'a EffectConfig,
    entries: &'a mut Vec<EffectEntry>,
}

impl<'a> EffectRegistry<'a> {
    pub fn new(config: &'a EffectConfig, entries: &'a mut Vec<EffectEntry>) -> Self {
        EffectRegistry { config, entries }
    }

    /// Replace-if-stronger policy: an incoming entry for a class already
    /// occupied replaces the existing one only if its multiplier-component
    /// product is strictly greater, or equal with a later expiry. Returns
    /// `true` if the registry changed.
    pub fn add_effect(
        &mut self,
        source: domain::EffectSourceId,
        class: StackingClass,
        multiplier: MultiplierVec,
        start: Timestamp,
        expiry: Timestamp,
    ) -> bool {
        let incoming = EffectEntry {
            source,
            class,
            multiplier,
            start,
            expiry,
        };
        if let Some(existing_idx) = self.entries.iter().position(|e| e.class == class) {
            let existing = &self.entries[existing_idx];
            let replace = incoming.strength() > existing.strength()
                || (incoming.strength() == existing.strength() && incoming.expiry > existing.expiry);
            if replace {
                self.entries[existing_idx] = incoming;
                true
            } else {
                false
            }
        } else {
            self.entries.push(incoming);
            true
        }
    }

    /// Removes every entry whose lifecycle is `Expired` at `now` and
    /// returns them, so the caller can force an accrual step under the
    /// pre-expiry rate up to the boundary before dropping them.
    pub fn purge_expired(&mut self, now: Timestamp) -> Vec<EffectEntry> {
        let (keep, expired): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|e| e.lifecycle_at(now) != domain::EffectLifecycle::Expired);
        *self.entries = keep;
        expired
    }

    /// The combined multiplier across every `Active` entry, product
    /// across classes, saturating-capped at `ceiling_per_axis` per axis.
    /// `Pending` and `Expired` entries contribute nothing.
    pub fn combined_multiplier(&self, now: Timestamp) -> MultiplierVec {
        let mut combined = MultiplierVec::IDENTITY;
        for entry in self.entries.iter() {
            if entry.lifecycle_at(now) == domain::EffectLifecycle::Active {
                combined = combined.saturating_mul(&entry.multiplier);
            }
        }
        self.cap(combined)
    }

    fn cap(&self, v: MultiplierVec) -> MultiplierVec {
        MultiplierVec {
            mining: v.mining.min(self.config.ceiling_per_axis),
            xp: v.xp.min(self.config.ceiling_per_axis),
            rp: v.rp.min(self.config.ceiling_per_axis),
        }
    }

    /// The multiplier contribution of a single axis, for call sites that
    /// only need one factor (e.g. the Mining Rate Calculator's
    /// `effects_mining_multiplier`).
    pub fn axis_multiplier(&self, now: Timestamp, axis: Axis) -> Fixed9 {
        self.combined_multiplier(now).get(axis)
    }

    pub fn active_sources(&self, now: Timestamp) -> Vec<domain::EffectSourceId> {
        self.entries
            .iter()
            .filter(|e| e.lifecycle_at(now) == domain::EffectLifecycle::Active)
            .map(|e| e.source.clone())
            .collect()
    }
}
