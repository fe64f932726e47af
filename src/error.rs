//! Error types for lrukit.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: a cache could not be constructed from the given
//!   parameters (zero capacity, zero bucket count). Nothing is built.
//! - [`InvariantError`]: returned by [`LruCache::check_invariants`] when the
//!   hash table and recency list disagree. This is a bug, not a runtime
//!   condition to recover from.
//!
//! A missing key is never an error: lookups return `Option`.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::LruCache;
//! use lrukit::error::ConfigError;
//!
//! let cache: Result<LruCache<String, String>, ConfigError> = LruCache::try_new(3);
//! assert!(cache.is_ok());
//!
//! let bad = LruCache::<String, String>::try_new(0);
//! assert!(bad.unwrap_err().to_string().contains("capacity"));
//! ```
//!
//! [`LruCache::check_invariants`]: crate::policy::lru::LruCache::check_invariants

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`LruCache::try_new`](crate::policy::lru::LruCache::try_new),
/// [`CacheConfig::validate`](crate::builder::CacheConfig::validate) and
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when the table, list and arena no longer agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
