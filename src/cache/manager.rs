//! Cache facade for persisting API responses to disk
//!
//! Provides a `ResponseCache` that keeps weather responses in memory keyed by
//! normalized location, and flushes the whole store to a JSON file after every
//! mutation.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::key::normalize_key;
use super::persist;
use super::store::{Entry, EntryStore, DEFAULT_MAX_ENTRIES};
use super::CacheError;

/// How long a cached response stays fresh unless configured otherwise
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

const APP_NAME: &str = "weather-cli";
const CACHE_FILE: &str = "cache.json";

/// Entry counts reported by [`ResponseCache::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
}

/// Thread-safe, disk-backed response cache
///
/// Reads (`get`, `stats`) take a shared lock; writes (`set`, `clear`) take an
/// exclusive lock and hold it until the file has been rewritten, so other
/// callers see either the complete old state or the complete new state.
#[derive(Debug)]
pub struct ResponseCache<T> {
    /// Location of the cache file
    path: PathBuf,
    ttl: Duration,
    max_entries: usize,
    store: RwLock<EntryStore<T>>,
}

impl<T> ResponseCache<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Opens the cache in the platform cache directory
    ///
    /// Uses `~/.cache/weather-cli/cache.json` on Linux, or the equivalent path
    /// on other platforms. A `ttl` of zero selects [`DEFAULT_TTL`]. Fails only
    /// if no cache directory can be determined; an unreadable cache file just
    /// yields an empty cache.
    pub fn new(ttl: Duration) -> Result<Self, CacheError> {
        let project_dirs = ProjectDirs::from("", "", APP_NAME).ok_or(CacheError::NoCacheDir)?;
        let path = project_dirs.cache_dir().join(CACHE_FILE);
        Ok(Self::open(path, ttl, DEFAULT_MAX_ENTRIES))
    }

    /// Opens the cache backed by a specific file
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_path(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self::open(path.into(), ttl, DEFAULT_MAX_ENTRIES)
    }

    /// Opens the cache with an explicit file, TTL and capacity
    pub fn open(path: PathBuf, ttl: Duration, max_entries: usize) -> Self {
        let ttl = if ttl.is_zero() { DEFAULT_TTL } else { ttl };

        let store = match persist::load(&path) {
            Ok(store) => {
                debug!(path = %path.display(), entries = store.len(), "Loaded cache file");
                store
            }
            Err(CacheError::NotFound(_)) => EntryStore::new(),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cache file, starting empty");
                EntryStore::new()
            }
        };

        Self {
            path,
            ttl,
            max_entries: max_entries.max(1),
            store: RwLock::new(store),
        }
    }

    /// Returns the cached record for `location` if present and fresh
    ///
    /// Expired entries are left in place; the next `set` purges them.
    pub fn get(&self, location: &str) -> Option<T> {
        let key = normalize_key(location);
        let store = self.store.read();

        match store.get(&key) {
            Some(entry) if entry.is_valid(self.ttl) => {
                debug!(location, "Cache hit");
                Some(entry.data().clone())
            }
            Some(_) => {
                debug!(location, "Cache entry expired");
                None
            }
            None => {
                debug!(location, "Cache miss");
                None
            }
        }
    }

    /// Stores `data` for `location` and rewrites the cache file
    ///
    /// # Returns
    /// * `Ok(())` when the entry is stored and persisted
    /// * `Err(CacheError::InvalidInput)` for a blank location or data that
    ///   serializes to `null`; nothing is stored
    /// * `Err(CacheError::PersistenceUnavailable)` if the file could not be
    ///   written; the entry is still cached for the rest of the process
    pub fn set(&self, location: &str, data: T) -> Result<(), CacheError> {
        let key = normalize_key(location);
        if key.is_empty() {
            return Err(CacheError::InvalidInput(
                "location must not be empty".to_string(),
            ));
        }
        if serializes_to_null(&data)? {
            return Err(CacheError::InvalidInput("data must not be null".to_string()));
        }

        let mut store = self.store.write();
        let evicted = store.insert_bounded(key, Entry::new(location, data), self.ttl, self.max_entries);
        if !evicted.is_empty() {
            debug!(?evicted, "Evicted oldest cache entries");
        }

        persist::save(&self.path, &store)
    }

    /// Removes every entry and rewrites the (now empty) cache file
    pub fn clear(&self) -> Result<(), CacheError> {
        let mut store = self.store.write();
        store.clear();
        persist::save(&self.path, &store)
    }

    /// Counts total, fresh and expired entries without modifying the cache
    pub fn stats(&self) -> CacheStats {
        let (total, valid, expired) = self.store.read().counts(chrono::Utc::now(), self.ttl);
        CacheStats {
            total,
            valid,
            expired,
        }
    }

    /// Path of the backing cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Returns true if `data` encodes as JSON `null`
///
/// Encoding stops as soon as the output is longer than `null`, so a large
/// record is not serialized in full just to be checked.
fn serializes_to_null<T: Serialize>(data: &T) -> Result<bool, CacheError> {
    let mut prefix = PrefixWriter::default();
    match serde_json::to_writer(&mut prefix, data) {
        Ok(()) => Ok(prefix.bytes == NULL),
        Err(_) if prefix.overflowed => Ok(false),
        Err(e) => Err(CacheError::Encode(e)),
    }
}

const NULL: &[u8] = b"null";

/// Keeps the first few bytes written and fails once they exceed `NULL`
#[derive(Default)]
struct PrefixWriter {
    bytes: Vec<u8>,
    overflowed: bool,
}

impl io::Write for PrefixWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.bytes.len() + buf.len() > NULL.len() {
            self.overflowed = true;
            return Err(io::Error::other("longer than null"));
        }
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde::{Deserialize, Serialize};
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn sample(name: &str) -> TestData {
        TestData {
            name: name.to_string(),
            value: 42,
        }
    }

    fn create_test_cache(ttl: Duration) -> (ResponseCache<TestData>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = ResponseCache::with_path(temp_dir.path().join("cache.json"), ttl);
        (cache, temp_dir)
    }

    #[test]
    fn test_set_then_get_is_case_insensitive() {
        let (cache, _temp_dir) = create_test_cache(DEFAULT_TTL);

        cache.set("London", sample("London")).expect("Set should succeed");

        assert_eq!(cache.get("london"), Some(sample("London")));
        assert_eq!(cache.get("  LONDON "), Some(sample("London")));
    }

    #[test]
    fn test_get_missing_location_returns_none() {
        let (cache, _temp_dir) = create_test_cache(DEFAULT_TTL);
        cache.set("London", sample("London")).expect("Set should succeed");

        assert!(cache.get("Paris").is_none());
    }

    #[test]
    fn test_expired_entry_is_absent_but_kept_until_next_set() {
        let (cache, _temp_dir) = create_test_cache(Duration::from_secs(1));
        cache.set("London", sample("London")).expect("Set should succeed");

        thread::sleep(Duration::from_millis(1100));

        assert!(cache.get("London").is_none(), "Entry should have expired");
        let stats = cache.stats();
        assert_eq!((stats.total, stats.expired), (1, 1), "Get must not delete");

        cache.set("Paris", sample("Paris")).expect("Set should succeed");
        assert_eq!(cache.stats().total, 1, "Set should purge expired entries");
    }

    #[test]
    fn test_zero_ttl_uses_default() {
        let (cache, _temp_dir) = create_test_cache(Duration::ZERO);
        assert_eq!(cache.ttl(), DEFAULT_TTL);
    }

    #[test]
    fn test_set_rejects_blank_location() {
        let (cache, temp_dir) = create_test_cache(DEFAULT_TTL);

        for location in ["", "   ", "\t\n"] {
            let result = cache.set(location, sample("x"));
            assert!(matches!(result, Err(CacheError::InvalidInput(_))));
        }
        assert_eq!(cache.stats().total, 0);
        assert!(!temp_dir.path().join("cache.json").exists());
    }

    #[test]
    fn test_set_rejects_null_data() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache: ResponseCache<Option<TestData>> =
            ResponseCache::with_path(temp_dir.path().join("cache.json"), DEFAULT_TTL);

        let result = cache.set("London", None);

        assert!(matches!(result, Err(CacheError::InvalidInput(_))));
        assert!(cache.get("London").is_none());
    }

    #[test]
    fn test_null_check_only_matches_null() {
        assert!(serializes_to_null(&None::<TestData>).expect("should encode"));
        assert!(serializes_to_null(&()).expect("should encode"));

        assert!(!serializes_to_null(&Some(sample("London"))).expect("should encode"));
        assert!(!serializes_to_null(&"null").expect("should encode"), "the string \"null\"");
        assert!(!serializes_to_null(&1234).expect("should encode"));
        assert!(!serializes_to_null(&0).expect("should encode"));
    }

    #[test]
    fn test_null_check_stops_early_on_large_records() {
        let large: Vec<TestData> = (0..10_000).map(|i| sample(&format!("City{i}"))).collect();

        assert!(!serializes_to_null(&large).expect("should encode"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let (cache, _temp_dir) = create_test_cache(DEFAULT_TTL);
        cache.set("London", sample("London")).expect("Set should succeed");
        cache.set("Paris", sample("Paris")).expect("Set should succeed");

        cache.clear().expect("Clear should succeed");

        assert!(cache.get("Paris").is_none());
        assert_eq!(cache.stats(), CacheStats::default());
        let reopened: ResponseCache<TestData> = ResponseCache::with_path(cache.path(), DEFAULT_TTL);
        assert_eq!(reopened.stats().total, 0);
    }

    #[test]
    fn test_persisted_state_survives_reopen() {
        let (cache, _temp_dir) = create_test_cache(DEFAULT_TTL);
        cache.set(" London ", sample("London")).expect("Set should succeed");

        let reopened: ResponseCache<TestData> = ResponseCache::with_path(cache.path(), DEFAULT_TTL);

        assert_eq!(reopened.get("london"), Some(sample("London")));
        let original = cache.store.read();
        let restored = reopened.store.read();
        let (a, b) = (
            original.get("london").expect("original entry"),
            restored.get("london").expect("restored entry"),
        );
        assert_eq!(b.location(), " London ", "Original location string is preserved");
        assert_eq!(a.cached_at(), b.cached_at());
    }

    #[test]
    fn test_corrupt_file_starts_empty_and_heals_on_set() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "invalid json{{{").expect("Should write file");

        let cache: ResponseCache<TestData> = ResponseCache::with_path(&path, DEFAULT_TTL);
        assert_eq!(cache.stats().total, 0);

        cache.set("London", sample("London")).expect("Set after corrupt load should succeed");

        let content = fs::read_to_string(&path).expect("Should read file");
        let value: serde_json::Value = serde_json::from_str(&content).expect("File should be valid JSON");
        assert_eq!(value["entries"]["london"]["data"]["name"], "London");
    }

    #[test]
    fn test_failed_persist_keeps_entry_in_memory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("cache.json");
        fs::create_dir(&path).expect("Should create directory");
        fs::write(path.join("occupied"), "x").expect("Should write file");
        let cache: ResponseCache<TestData> = ResponseCache::with_path(&path, DEFAULT_TTL);

        let result = cache.set("London", sample("London"));

        assert!(matches!(result, Err(CacheError::PersistenceUnavailable { .. })));
        assert_eq!(cache.get("London"), Some(sample("London")));
    }

    #[test]
    fn test_capacity_keeps_most_recent_entries() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache: ResponseCache<TestData> =
            ResponseCache::open(temp_dir.path().join("cache.json"), DEFAULT_TTL, DEFAULT_MAX_ENTRIES);

        for i in 0..110 {
            cache
                .set(&format!("Location{i}"), sample("x"))
                .expect("Set should succeed");
            assert!(cache.stats().total <= DEFAULT_MAX_ENTRIES);
        }

        assert_eq!(cache.stats().total, 100);
        for i in 0..10 {
            assert!(cache.get(&format!("Location{i}")).is_none(), "Location{i} should be evicted");
        }
        for i in 10..110 {
            assert!(cache.get(&format!("Location{i}")).is_some(), "Location{i} should remain");
        }
    }

    #[test]
    fn test_stats_counts_expired_entries() {
        let (cache, _temp_dir) = create_test_cache(Duration::from_secs(3600));
        cache.set("London", sample("London")).expect("Set should succeed");
        cache.set("Paris", sample("Paris")).expect("Set should succeed");
        cache.store.write().insert_unchecked(
            "expired".into(),
            Entry::with_timestamp("Expired", sample("Expired"), Utc::now() - chrono::Duration::hours(2)),
        );

        let stats = cache.stats();

        assert_eq!(stats, CacheStats { total: 3, valid: 2, expired: 1 });
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let (cache, _temp_dir) = create_test_cache(DEFAULT_TTL);
        let cache = Arc::new(cache);
        let writers = 8;
        let readers = 8;

        thread::scope(|scope| {
            for w in 0..writers {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    let location = format!("City{w}");
                    cache.set(&location, sample(&location)).expect("Set should succeed");
                });
            }
            for _ in 0..readers {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    for w in 0..writers {
                        if let Some(data) = cache.get(&format!("city{w}")) {
                            assert_eq!(data.name, format!("City{w}"));
                        }
                        let stats = cache.stats();
                        assert_eq!(stats.valid + stats.expired, stats.total);
                    }
                });
            }
        });

        for w in 0..writers {
            assert!(cache.get(&format!("City{w}")).is_some());
        }
        let reopened: ResponseCache<TestData> = ResponseCache::with_path(cache.path(), DEFAULT_TTL);
        assert_eq!(reopened.stats().total, writers);
    }

    #[test]
    fn test_two_instances_sharing_a_file_do_not_collide() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("cache.json");
        let first: ResponseCache<TestData> = ResponseCache::with_path(&path, DEFAULT_TTL);
        let second: ResponseCache<TestData> = ResponseCache::with_path(&path, DEFAULT_TTL);

        for round in 0..20 {
            thread::scope(|scope| {
                for (name, cache) in [("First", &first), ("Second", &second)] {
                    scope.spawn(move || {
                        for i in 0..5 {
                            let location = format!("{name}{round}-{i}");
                            cache
                                .set(&location, sample(&location))
                                .expect("Set should succeed");
                        }
                    });
                }
            });

            let reopened: ResponseCache<TestData> = ResponseCache::with_path(&path, DEFAULT_TTL);
            assert!(reopened.stats().total > 0, "File must hold a complete store");
        }

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("Should list directory")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "cache.json")
            .collect();
        assert!(leftovers.is_empty(), "No staging files should remain");
    }

    #[test]
    fn test_new_uses_platform_cache_dir() {
        if let Ok(cache) = ResponseCache::<TestData>::new(DEFAULT_TTL) {
            let path = cache.path().to_string_lossy();
            assert!(path.contains("weather-cli"), "Cache path should contain app name");
            assert!(path.ends_with("cache.json"));
        }
        // Passes if no cache directory is available (e.g. no home directory in CI)
    }
}
