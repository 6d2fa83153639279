//! In-memory entry store with expiry and eviction
//!
//! The store itself is not synchronized; [`super::ResponseCache`] guards it
//! with a reader/writer lock.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in the store
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// A single cached record
///
/// Entries are immutable: updating a location replaces its entry with a new
/// one carrying a fresh `cached_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    /// Location as originally supplied (not normalized)
    location: String,
    /// The cached record, stored verbatim
    data: T,
    /// When the entry was created
    cached_at: DateTime<Utc>,
}

impl<T> Entry<T> {
    /// Creates an entry timestamped with the current time
    pub fn new(location: impl Into<String>, data: T) -> Self {
        Self::with_timestamp(location, data, Utc::now())
    }

    pub(crate) fn with_timestamp(
        location: impl Into<String>,
        data: T,
        cached_at: DateTime<Utc>,
    ) -> Self {
        Self {
            location: location.into(),
            data,
            cached_at,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// Returns true if the entry is younger than `ttl`
    pub fn is_valid(&self, ttl: Duration) -> bool {
        self.is_valid_at(Utc::now(), ttl)
    }

    /// Returns true iff `now - cached_at < ttl`
    ///
    /// An entry exactly `ttl` old is expired. Entries stamped in the future
    /// (clock moved backwards) count as fresh.
    pub fn is_valid_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.cached_at).to_std() {
            Ok(age) => age < ttl,
            Err(_) => true,
        }
    }
}

/// Mapping from normalized key to entry
///
/// Backed by a `BTreeMap` so the persisted file and eviction tie-breaks are
/// deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct EntryStore<T> {
    #[serde(default)]
    entries: BTreeMap<String, Entry<T>>,
}

impl<T> Default for EntryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntryStore<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Entry<T>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Entry<T>)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Inserts without any expiry or capacity checks
    pub(crate) fn insert_unchecked(&mut self, key: String, entry: Entry<T>) -> Option<Entry<T>> {
        self.entries.insert(key, entry)
    }

    /// Removes every entry that is no longer valid at `now`
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_valid_at(now, ttl));
        before - self.entries.len()
    }

    /// Removes the entry with the smallest `cached_at`
    ///
    /// Ties go to the lexicographically smallest key.
    pub fn remove_oldest(&mut self) -> Option<(String, Entry<T>)> {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.cached_at)
            .map(|(key, _)| key.clone())?;

        self.entries.remove_entry(&oldest)
    }

    /// Inserts `entry` under `key` while keeping the store within `max_entries`
    ///
    /// Expired entries are purged first. If the key is new and the store is
    /// still full, the oldest entries are evicted until there is room.
    /// Returns the keys that were evicted for capacity.
    pub fn insert_bounded(
        &mut self,
        key: String,
        entry: Entry<T>,
        ttl: Duration,
        max_entries: usize,
    ) -> Vec<String> {
        let max_entries = max_entries.max(1);
        self.cleanup_expired(entry.cached_at, ttl);

        let mut evicted = Vec::new();
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= max_entries {
                match self.remove_oldest() {
                    Some((old_key, _)) => evicted.push(old_key),
                    None => break,
                }
            }
        }

        self.entries.insert(key, entry);
        evicted
    }

    /// Counts `(total, valid, expired)` entries at `now`
    pub fn counts(&self, now: DateTime<Utc>, ttl: Duration) -> (usize, usize, usize) {
        let total = self.entries.len();
        let valid = self
            .entries
            .values()
            .filter(|entry| entry.is_valid_at(now, ttl))
            .count();
        (total, valid, total - valid)
    }
}
