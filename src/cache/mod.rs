//! Local response cache
//!
//! A bounded, TTL-based key-value store persisted to a single JSON file in the
//! user's cache directory (`~/.cache/weather-cli/cache.json` on Linux). The
//! cache sits between the CLI and the weather API: callers check it before
//! fetching and store fresh responses after a successful fetch.
//!
//! - [`key`] canonicalizes location strings into cache keys
//! - [`store`] holds the timestamped entries and the expiry/eviction rules
//! - [`persist`] reads and atomically rewrites the cache file
//! - [`ResponseCache`] composes the three behind a single reader/writer lock

mod key;
mod manager;
pub mod persist;
mod store;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use key::normalize_key;
pub use manager::{CacheStats, ResponseCache, DEFAULT_TTL};
pub use store::{Entry, EntryStore, DEFAULT_MAX_ENTRIES};

/// Errors returned by cache operations
///
/// None of these are fatal to the application: the cache can always be
/// bypassed by fetching live data.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Empty location or absent data passed to `set`
    #[error("Invalid cache input: {0}")]
    InvalidInput(String),

    /// Directory creation, file read, write or rename failed
    #[error("Cache file unavailable at {}: {source}", .path.display())]
    PersistenceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The in-memory store could not be encoded as JSON
    #[error("Failed to encode cache: {0}")]
    Encode(#[source] serde_json::Error),

    /// The cache file exists but does not contain a valid store
    #[error("Cache file at {} is corrupt: {source}", .path.display())]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No cache file has been written yet
    #[error("No cache file at {}", .0.display())]
    NotFound(PathBuf),

    /// The platform offers no user cache directory (e.g. no home directory)
    #[error("Could not determine a user cache directory")]
    NoCacheDir,
}
