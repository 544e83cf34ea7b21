//! # Concurrent entry table.
//!
//! [`Store`] wraps a sharded concurrent map so that readers and writers on
//! different keys never contend, while all reads and writes touching one
//! key go through a single shard guard and observe whole records only.
//!
//! ## Rules
//! - [`Store::install`] is a race-free upsert: concurrent installs for the
//!   same first-seen key yield exactly one `Inserted` outcome
//! - [`Store::complete`] writes `value` and `status` under one guard;
//!   readers never see a torn pair
//! - Records are removed only by their owning worker ([`Store::remove`])
//! - No iteration is offered; lookups are per-key only

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::key::Key;
use crate::recipes::RecipeRef;
use crate::store::record::{Record, Stamp, Status, next_stamp};

/// Outcome of [`Store::install`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Installed {
    /// The key was known; its recipe and stamp were replaced in place.
    Updated,
    /// The key was first-seen; a fresh record was created.
    Inserted,
}

/// Shared table of live cache entries.
pub struct Store<V> {
    entries: DashMap<Key, Record<V>>,
}

impl<V: Clone> Store<V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns true if a live record exists for `key`.
    pub fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no records are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Installs `recipe` for `key`, drawing a fresh stamp.
    ///
    /// Updates the record in place when the key is known, otherwise creates
    /// a `Busy` record with no value. The update-or-insert decision and the
    /// write happen under one entry guard, so two concurrent installs for
    /// the same new key produce exactly one `Inserted`.
    pub fn install(&self, key: Key, recipe: RecipeRef<V>) -> Installed {
        let stamp = next_stamp();
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                record.recipe = recipe;
                record.stamp = stamp;
                Installed::Updated
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Record::new(recipe, stamp));
                Installed::Inserted
            }
        }
    }

    /// Writes a successfully computed `value` and marks the record `Ready`.
    ///
    /// Both fields change under one guard. Returns false if the key is
    /// absent (the entry expired between the worker's read and this write).
    pub fn complete(&self, key: &Key, value: V) -> bool {
        match self.entries.get_mut(key) {
            Some(mut record) => {
                record.value = Some(value);
                record.status = Status::Ready;
                true
            }
            None => false,
        }
    }

    /// Reads the current stamp for `key`.
    pub fn stamp(&self, key: &Key) -> Option<Stamp> {
        self.entries.get(key).map(|r| r.stamp)
    }

    /// Reads the current stamp and recipe for `key` under one guard.
    ///
    /// The worker's per-tick view: the stamp decides whether to compute and
    /// the recipe is what to compute.
    pub fn peek(&self, key: &Key) -> Option<(Stamp, RecipeRef<V>)> {
        self.entries.get(key).map(|r| (r.stamp, r.recipe.clone()))
    }

    /// Reads the current status and value for `key` under one guard.
    ///
    /// The reader's view; cloning the value keeps `get` wait-free.
    pub fn fetch(&self, key: &Key) -> Option<(Status, Option<V>)> {
        self.entries.get(key).map(|r| (r.status, r.value.clone()))
    }

    /// Deletes the record for `key`. Returns false if it was already gone.
    pub fn remove(&self, key: &Key) -> bool {
        self.entries.remove(key).is_some()
    }
}

impl<V: Clone> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::RecipeFn;

    fn recipe(v: u32) -> RecipeRef<u32> {
        RecipeFn::arc(move || async move { Ok(v) })
    }

    #[test]
    fn install_inserts_then_updates() {
        let store: Store<u32> = Store::new();
        let key = Key::from("HEL");

        assert_eq!(store.install(key.clone(), recipe(1)), Installed::Inserted);
        assert_eq!(store.install(key.clone(), recipe(2)), Installed::Updated);
        assert_eq!(store.len(), 1);
        assert!(store.contains(&key));
    }

    #[test]
    fn install_draws_strictly_increasing_stamps() {
        let store: Store<u32> = Store::new();
        let key = Key::from("HEL");

        store.install(key.clone(), recipe(1));
        let first = store.stamp(&key).unwrap();
        store.install(key.clone(), recipe(2));
        let second = store.stamp(&key).unwrap();
        assert!(second > first);
    }

    #[test]
    fn fresh_record_is_busy_without_value() {
        let store: Store<u32> = Store::new();
        let key = Key::from("HEL");
        store.install(key.clone(), recipe(1));

        assert_eq!(store.fetch(&key), Some((Status::Busy, None)));
    }

    #[test]
    fn complete_sets_value_and_ready_together() {
        let store: Store<u32> = Store::new();
        let key = Key::from("HEL");
        store.install(key.clone(), recipe(1));

        assert!(store.complete(&key, 7));
        assert_eq!(store.fetch(&key), Some((Status::Ready, Some(7))));
    }

    #[test]
    fn complete_on_absent_key_reports_false() {
        let store: Store<u32> = Store::new();
        assert!(!store.complete(&Key::from("gone"), 1));
    }

    #[test]
    fn update_preserves_value_and_status() {
        let store: Store<u32> = Store::new();
        let key = Key::from("HEL");
        store.install(key.clone(), recipe(1));
        store.complete(&key, 7);

        store.install(key.clone(), recipe(2));
        assert_eq!(store.fetch(&key), Some((Status::Ready, Some(7))));
    }

    #[test]
    fn remove_deletes_the_record() {
        let store: Store<u32> = Store::new();
        let key = Key::from("HEL");
        store.install(key.clone(), recipe(1));

        assert!(store.remove(&key));
        assert!(!store.remove(&key));
        assert!(!store.contains(&key));
    }
}
