#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! TTL result cache for assessment outputs.
//!
//! Shared across the engine's point, grid, and time-series paths. Batch
//! operations key each element independently (one entry per grid cell, one
//! per series date) so partial hits work across a grid. Keys are derived
//! deterministically from sorted parameters, which also makes concurrent
//! writes to the same key idempotent.
//!
//! Cache failures are never fatal: callers treat a failed read as a miss
//! and a failed write as a no-op.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error returned when a cache backend cannot serve a request.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store could not be reached or was corrupted.
    #[error("cache unavailable: {message}")]
    Unavailable {
        /// The failure description.
        message: String,
    },
}

/// Derives the canonical cache key for a namespace and parameter set.
///
/// Parameters are stably sorted by name before joining, so logically
/// identical parameter sets yield identical keys regardless of
/// construction order. Callers render float parameters with fixed
/// precision.
#[must_use]
pub fn cache_key(namespace: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by_key(|(name, _)| *name);

    let joined = sorted
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("|");

    format!("{namespace}:{joined}")
}

/// A key/value store whose entries expire after a per-write TTL.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Fetches a live entry.
    ///
    /// A miss covers both never-written and expired keys; callers cannot
    /// distinguish the two and should not need to.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend failed; callers treat this as
    /// a miss.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Unconditionally overwrites `key` with `value` for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend failed; callers treat this as
    /// a no-op.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;
}

/// Tuning for [`MemoryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    /// Upper bound on stored entries. Writes past the bound purge expired
    /// entries first, then evict the earliest-expiring live ones.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 10_000 }
    }
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Process-local [`ResultCache`] over a `BTreeMap` behind an `RwLock`.
///
/// Expired entries are evicted lazily when a read lands on them. Lock
/// critical sections are short and never held across an await.
pub struct MemoryCache {
    config: CacheConfig,
    entries: RwLock<BTreeMap<String, CacheEntry>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of stored entries, expired ones included.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the lock was poisoned.
    pub fn len(&self) -> Result<usize, CacheError> {
        Ok(self.read_entries()?.len())
    }

    /// Whether the cache holds no entries at all.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the lock was poisoned.
    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.read_entries()?.is_empty())
    }

    fn read_entries(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, CacheEntry>>, CacheError> {
        self.entries.read().map_err(|e| CacheError::Unavailable {
            message: e.to_string(),
        })
    }

    fn write_entries(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, CacheEntry>>, CacheError> {
        self.entries.write().map_err(|e| CacheError::Unavailable {
            message: e.to_string(),
        })
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let now = Instant::now();

        {
            let entries = self.read_entries()?;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Lazy eviction: the entry was present but expired. Re-check under
        // the write lock since another writer may have refreshed it.
        let mut entries = self.write_entries()?;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
            entries.remove(key);
        }

        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.write_entries()?;

        if !entries.contains_key(key) && entries.len() >= self.config.max_entries {
            entries.retain(|_, entry| entry.expires_at > now);

            while entries.len() >= self.config.max_entries {
                let Some(earliest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                entries.remove(&earliest);
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );

        Ok(())
    }
}
