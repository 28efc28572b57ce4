//! Expiring Cache Module
//!
//! Generic read-through cache with a fixed per-instance TTL.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, Clock, StatsRecorder, SystemClock};
use crate::error::CacheError;

// == Expiring Cache ==
/// Thread-safe key-value cache whose entries go stale a fixed duration after
/// they are stored.
///
/// Expired entries are not swept in the background. They stay in the map until
/// the key is written again, invalidated, or the cache is cleared, so a cache
/// fed an unbounded set of distinct keys grows without bound.
pub struct ExpiringCache<K, V> {
    /// Label used in logs and statistics
    name: &'static str,
    /// Key-value storage
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    /// Lifetime applied to every stored entry
    ttl: Duration,
    /// Time source for expiration checks
    clock: Arc<dyn Clock>,
    /// Hit/miss counters
    stats: StatsRecorder,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache applying `ttl` to every entry.
    ///
    /// A zero TTL stores entries that are stale immediately, so every `get`
    /// runs its loader.
    pub fn new(ttl: Duration) -> Self {
        Self {
            name: "cache",
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock: Arc::new(SystemClock),
            stats: StatsRecorder::new(),
        }
    }

    /// Creates a cache from a signed TTL in seconds, rejecting negative values.
    pub fn try_from_secs(ttl_secs: i64) -> Result<Self, CacheError> {
        let secs = u64::try_from(ttl_secs).map_err(|_| CacheError::InvalidTtl(ttl_secs))?;
        Ok(Self::new(Duration::from_secs(secs)))
    }

    /// Sets the label used in logs and statistics.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    // == Get ==
    /// Returns the live value for `key`, or runs `loader` and caches its result.
    ///
    /// The map lock is not held while `loader` runs. Concurrent misses on the
    /// same key may each run their loader; whichever stores last wins.
    /// A loader error is returned unchanged and nothing is cached.
    pub fn get<F, E>(&self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(value) = self.get_if_present(&key) {
            self.stats.record_hit();
            debug!(cache = self.name, "cache hit");
            return Ok(value);
        }

        self.stats.record_miss();
        debug!(cache = self.name, "cache miss, loading");

        match loader(&key) {
            Ok(value) => {
                self.put(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                self.stats.record_load_failure();
                warn!(cache = self.name, "loader failed, nothing cached");
                Err(err)
            }
        }
    }

    /// Infallible form of [`get`](Self::get).
    pub fn get_with<F>(&self, key: K, loader: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        match self.get(key, |k| Ok::<V, Infallible>(loader(k))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    // == Get If Present ==
    /// Returns the live value for `key` without loading or touching statistics.
    pub fn get_if_present<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_ms();
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    // == Put ==
    /// Stores `value` under `key`, replacing any previous entry and resetting
    /// its expiration to now + ttl.
    pub fn put(&self, key: K, value: V) {
        let entry = CacheEntry::new(value, self.clock.now_ms(), self.ttl_ms());
        self.entries.write().insert(key, entry);
    }

    // == Invalidate ==
    /// Removes the entry for `key`. No-op if absent.
    pub fn invalidate<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.entries.write().remove(key).is_some();
        self.stats.record_invalidation();
        debug!(cache = self.name, removed, "invalidated key");
    }

    /// Removes every entry.
    pub fn invalidate_all(&self) {
        let cleared = {
            let mut entries = self.entries.write();
            let count = entries.len();
            entries.clear();
            count
        };
        self.stats.record_invalidation();
        debug!(cache = self.name, cleared, "invalidated all entries");
    }

    // == Accessors ==
    /// Returns the number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    fn ttl_ms(&self) -> u64 {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }
}

impl<K, V> fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.read().len())
            .finish_non_exhaustive()
    }
}
