// Copyright 2024 Finova Network Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User persistence and the per-user single-writer discipline.
//!
//! Every mutation of a [`UserAggregate`] goes through
//! [`UserStore::with_user_mut`], which takes that user's own lock and
//! holds nothing else while doing so. Operations that touch two users
//! at once (crediting a referrer when a referee acts) always lock the
//! lower `UserId` first, so two engine threads racing on the same pair
//! of users can never deadlock against each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use domain::{Timestamp, UserAggregate, UserId};

use crate::error::EngineError;

/// Abstracts over how [`UserAggregate`]s are stored so the engine can be
/// pointed at an in-memory map in tests and at a durable backend in
/// production without changing any orchestration logic.
pub trait UserStore: Send + Sync {
    fn insert_new(&self, user: UserAggregate) -> Result<(), EngineError>;

    fn contains(&self, user_id: UserId) -> bool;

    /// Runs `f` with exclusive access to `user_id`'s aggregate, holding
    /// only that user's lock for the duration of the call.
    fn with_user_mut<R>(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut UserAggregate) -> Result<R, EngineError>,
    ) -> Result<R, EngineError>;

    /// Runs `f` with exclusive access to both `a` and `b`'s aggregates
    /// at once, acquired in ascending `UserId` order regardless of the
    /// order the caller names them in.
    fn with_two_users_mut<R>(
        &self,
        a: UserId,
        b: UserId,
        f: impl FnOnce(&mut UserAggregate, &mut UserAggregate) -> Result<R, EngineError>,
    ) -> Result<R, EngineError>;

    /// Runs `f` with exclusive access to every aggregate named in `ids`
    /// at once, acquired in ascending `UserId` order regardless of the
    /// order `ids` names them in, and handed back to `f` in `ids`'
    /// original order. Used for the reward propagator's transactional
    /// guarantee that an originating user's event and every ancestor it
    /// credits commit together or not at all. `ids` must name distinct
    /// users.
    fn with_many_users_mut<R>(
        &self,
        ids: &[UserId],
        f: impl FnOnce(&mut [&mut UserAggregate]) -> Result<R, EngineError>,
    ) -> Result<R, EngineError>;

    /// A read-only snapshot clone, for status queries that don't need
    /// the full read-modify-write path.
    fn snapshot(&self, user_id: UserId) -> Option<UserAggregate>;

    fn all_user_ids(&self) -> Vec<UserId>;
}

/// Reference [`UserStore`] implementation: an outer `RwLock` guarding the
/// registry of per-user cells, each independently mutex-protected. The
/// outer lock is only ever held briefly, to look up or insert a cell;
/// the long-held lock during a read-modify-write is always the inner
/// per-user one.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, Arc<Mutex<UserAggregate>>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, user_id: UserId) -> Option<Arc<Mutex<UserAggregate>>> {
        self.users.read().get(&user_id).cloned()
    }
}

impl UserStore for InMemoryUserStore {
    fn insert_new(&self, user: UserAggregate) -> Result<(), EngineError> {
        let mut guard = self.users.write();
        if guard.contains_key(&user.user_id) {
            return Err(EngineError::InvalidConfig(format!(
                "user {} already exists",
                user.user_id
            )));
        }
        guard.insert(user.user_id, Arc::new(Mutex::new(user)));
        Ok(())
    }

    fn contains(&self, user_id: UserId) -> bool {
        self.users.read().contains_key(&user_id)
    }

    fn with_user_mut<R>(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut UserAggregate) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let cell = self.cell(user_id).ok_or(EngineError::UnknownUser(user_id))?;
        let mut guard = cell.lock();
        f(&mut guard)
    }

    fn with_two_users_mut<R>(
        &self,
        a: UserId,
        b: UserId,
        f: impl FnOnce(&mut UserAggregate, &mut UserAggregate) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        if a == b {
            return Err(EngineError::InvalidConfig(
                "with_two_users_mut requires distinct users".to_string(),
            ));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_cell = self.cell(first).ok_or(EngineError::UnknownUser(first))?;
        let second_cell = self.cell(second).ok_or(EngineError::UnknownUser(second))?;

        let mut first_guard = first_cell.lock();
        let mut second_guard = second_cell.lock();
        if a < b {
            f(&mut first_guard, &mut second_guard)
        } else {
            f(&mut second_guard, &mut first_guard)
        }
    }

    fn with_many_users_mut<R>(
        &self,
        ids: &[UserId],
        f: impl FnOnce(&mut [&mut UserAggregate]) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let mut sorted: Vec<UserId> = ids.to_vec();
        sorted.sort();
        sorted.dedup();
        if sorted.len() != ids.len() {
            return Err(EngineError::InvalidConfig(
                "with_many_users_mut requires distinct user ids".to_string(),
            ));
        }

        let mut cells = Vec::with_capacity(sorted.len());
        for id in &sorted {
            cells.push(self.cell(*id).ok_or(EngineError::UnknownUser(*id))?);
        }
        // Locks are acquired here, in ascending id order, and held for
        // the rest of this call.
        let mut guards: Vec<_> = cells.iter().map(|cell| cell.lock()).collect();
        let mut slots: Vec<Option<&mut UserAggregate>> =
            guards.iter_mut().map(|guard| Some(&mut **guard)).collect();

        let mut ordered: Vec<&mut UserAggregate> = Vec::with_capacity(ids.len());
        for id in ids {
            let idx = sorted.binary_search(id).expect("id was just sorted from this slice");
            ordered.push(slots[idx].take().expect("each sorted id is handed out exactly once"));
        }
        f(&mut ordered)
    }

    fn snapshot(&self, user_id: UserId) -> Option<UserAggregate> {
        self.cell(user_id).map(|cell| cell.lock().clone())
    }

    fn all_user_ids(&self) -> Vec<UserId> {
        self.users.read().keys().copied().collect()
    }
}

/// Seeds a fresh aggregate for `user_id` and inserts it, returning an
/// error if the id is already registered.
pub fn create_user(
    store: &dyn UserStore,
    user_id: UserId,
    created_at: Timestamp,
    utc_offset_minutes: i32,
) -> Result<(), EngineError> {
    store.insert_new(UserAggregate::new(user_id, created_at, utc_offset_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64) -> UserAggregate {
        UserAggregate::new(UserId(id), Timestamp::from_unix_secs(0), 0)
    }

    #[test]
    fn insert_and_lookup_round_trips() {
        let store = InMemoryUserStore::new();
        store.insert_new(user(1)).unwrap();
        assert!(store.contains(UserId(1)));
        assert!(!store.contains(UserId(2)));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryUserStore::new();
        store.insert_new(user(1)).unwrap();
        assert!(store.insert_new(user(1)).is_err());
    }

    #[test]
    fn with_user_mut_on_unknown_user_errors() {
        let store = InMemoryUserStore::new();
        let result = store.with_user_mut(UserId(1), |_| Ok(()));
        assert!(matches!(result, Err(EngineError::UnknownUser(_))));
    }

    #[test]
    fn with_user_mut_mutates_in_place() {
        let store = InMemoryUserStore::new();
        store.insert_new(user(1)).unwrap();
        store
            .with_user_mut(UserId(1), |u| {
                u.streak_counter = 7;
                Ok(())
            })
            .unwrap();
        assert_eq!(store.snapshot(UserId(1)).unwrap().streak_counter, 7);
    }

    #[test]
    fn with_two_users_mut_locks_regardless_of_argument_order() {
        let store = InMemoryUserStore::new();
        store.insert_new(user(1)).unwrap();
        store.insert_new(user(2)).unwrap();

        store
            .with_two_users_mut(UserId(2), UserId(1), |lower, higher| {
                lower.streak_counter = 1;
                higher.streak_counter = 2;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.snapshot(UserId(1)).unwrap().streak_counter, 1);
        assert_eq!(store.snapshot(UserId(2)).unwrap().streak_counter, 2);
    }

    #[test]
    fn with_two_users_mut_rejects_same_user_twice() {
        let store = InMemoryUserStore::new();
        store.insert_new(user(1)).unwrap();
        let result = store.with_two_users_mut(UserId(1), UserId(1), |_, _| Ok(()));
        assert!(result.is_err());
    }

    #[test]
    fn with_many_users_mut_preserves_caller_order_regardless_of_lock_order() {
        let store = InMemoryUserStore::new();
        store.insert_new(user(1)).unwrap();
        store.insert_new(user(2)).unwrap();
        store.insert_new(user(3)).unwrap();

        store
            .with_many_users_mut(&[UserId(3), UserId(1), UserId(2)], |users| {
                assert_eq!(users.len(), 3);
                assert_eq!(users[0].user_id, UserId(3));
                assert_eq!(users[1].user_id, UserId(1));
                assert_eq!(users[2].user_id, UserId(2));
                for (i, u) in users.iter_mut().enumerate() {
                    u.streak_counter = i as u32;
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(store.snapshot(UserId(3)).unwrap().streak_counter, 0);
        assert_eq!(store.snapshot(UserId(1)).unwrap().streak_counter, 1);
        assert_eq!(store.snapshot(UserId(2)).unwrap().streak_counter, 2);
    }

    #[test]
    fn with_many_users_mut_rejects_duplicate_ids() {
        let store = InMemoryUserStore::new();
        store.insert_new(user(1)).unwrap();
        let result = store.with_many_users_mut(&[UserId(1), UserId(1)], |_| Ok(()));
        assert!(result.is_err());
    }

    #[test]
    fn with_many_users_mut_rejects_unknown_user() {
        let store = InMemoryUserStore::new();
        store.insert_new(user(1)).unwrap();
        let result = store.with_many_users_mut(&[UserId(1), UserId(2)], |_| Ok(()));
        assert!(matches!(result, Err(EngineError::UnknownUser(UserId(2)))));
    }
}
