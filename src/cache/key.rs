//! Cache key normalization
//!
//! Location strings typed by users vary in case and surrounding whitespace.
//! Every cache operation runs the location through [`normalize_key`] so that
//! "London", " london " and "LONDON" share a single cache slot.

/// Maps a free-form location string to its canonical cache key.
///
/// Trims leading/trailing whitespace and lower-cases the result. Distinct
/// places that normalize to the same string share a cache slot.
pub fn normalize_key(location: &str) -> String {
    location.trim().to_lowercase()
}
