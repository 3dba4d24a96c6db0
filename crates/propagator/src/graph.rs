// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;

use domain::UserId;

/// One ancestor in a 3-hop upline walk, tagged with its hop depth (1 =
/// direct referrer, 2 = indirect, 3 = great-indirect).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ancestor {
    pub user_id: UserId,
    pub depth: u8,
}

/// The referral graph's direct-edge index and a recomputable ancestor
/// cache, owned by the propagator. The forward direct-referral index
/// (user -> set of direct referees) is kept alongside so active-referral
/// counting and fan-out features can be served without a reverse scan.
#[derive(Clone, Debug, Default)]
pub struct ReferralGraphIndex {
    /// referee -> direct referrer.
    direct_referrer: HashMap<UserId, UserId>,
    /// referrer -> direct referees.
    direct_referrals: HashMap<UserId, Vec<UserId>>,
    /// referee -> ancestors up to depth 3, recomputed lazily.
    ancestor_cache: HashMap<UserId, Vec<Ancestor>>,
}

impl ReferralGraphIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new direct-referrer edge. Edges are immutable once added
    /// (callers must validate with `referral_engine::validate_referrer_assignment`
    /// first); only `user`'s own ancestor cache entry is invalidated, since
    /// no other cached chain can pass through an edge that did not exist
    /// yet when it was computed.
    pub fn add_edge(&mut self, user: UserId, referrer: UserId) {
        self.direct_referrer.insert(user, referrer);
        self.direct_referrals.entry(referrer).or_default().push(user);
        self.ancestor_cache.remove(&user);
    }

    pub fn direct_referrer_of(&self, user: UserId) -> Option<UserId> {
        self.direct_referrer.get(&user).copied()
    }

    pub fn direct_referrals_of(&self, user: UserId) -> &[UserId] {
        self.direct_referrals.get(&user).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Read-through ancestor walk, bounded to 3 hops. Stops at the first
    /// missing referrer edge (an account with no referrer, i.e. the root
    /// of its forest) rather than skipping over the gap.
    pub fn ancestors(&mut self, user: UserId) -> &[Ancestor] {
        if !self.ancestor_cache.contains_key(&user) {
            let mut chain = Vec::with_capacity(3);
            let mut current = user;
            for depth in 1..=3u8 {
                match self.direct_referrer.get(&current) {
                    Some(&next) => {
                        chain.push(Ancestor { user_id: next, depth });
                        current = next;
                    }
                    None => break,
                }
            }
            self.ancestor_cache.insert(user, chain);
        }
        self.ancestor_cache.get(&user).map(Vec::as_slice).unwrap_or(&[])
    }
}
