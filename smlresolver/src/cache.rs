//! In-memory TTL cache for resolved metadata
//!
//! Entries are keyed by `sourceUrl:countryCode`. An entry is valid while its
//! age is strictly below the TTL; expired entries read as misses and are
//! dropped on access. When an insertion pushes the cache past its capacity,
//! expired entries are pruned first and then the oldest tenth of the entries
//! (insertion order, not LRU) is evicted.
//!
//! The cache lives in process memory. Several instances of the service each
//! hold their own copy; sharing results across instances needs an external
//! store.

use indexmap::IndexMap;
use serde::Serialize;
use smlcore::TrackMetadata;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Default entry lifetime (24 hours)
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 3600);

/// Default number of entries before eviction kicks in
pub const DEFAULT_CAPACITY: usize = 1000;

/// One cached resolution
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: TrackMetadata,
    pub stored_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: IndexMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Bounded TTL cache of [`TrackMetadata`]
#[derive(Debug)]
pub struct MetadataCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    capacity: usize,
}

impl MetadataCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Builds the cache key for a source URL and a country code
    pub fn key(source_url: &str, country_code: &str) -> String {
        format!("{source_url}:{country_code}")
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the cached value, or `None` when absent or expired.
    /// An expired entry is removed on the way.
    pub async fn get(&self, key: &str) -> Option<TrackMetadata> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        match state.entries.get(key).map(|entry| entry.is_valid_at(now)) {
            Some(true) => {
                state.hits += 1;
                state.entries.get(key).map(|entry| entry.value.clone())
            }
            Some(false) => {
                debug!(key = %key, "Cache entry expired");
                state.entries.shift_remove(key);
                state.misses += 1;
                None
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Inserts or replaces an entry. A replaced entry counts as a fresh
    /// insertion for eviction order.
    pub async fn put(&self, key: impl Into<String>, value: TrackMetadata) {
        let key = key.into();
        let mut state = self.state.lock().await;

        state.entries.shift_remove(&key);
        state.entries.insert(
            key.clone(),
            CacheEntry {
                key,
                value,
                stored_at: Instant::now(),
                ttl: self.ttl,
            },
        );

        if state.entries.len() > self.capacity {
            self.evict(&mut state);
        }
    }

    fn evict(&self, state: &mut CacheState) {
        let now = Instant::now();
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_valid_at(now));

        let len = state.entries.len();
        if len > self.capacity {
            let count = len.div_ceil(10);
            state.entries.drain(..count);
        }

        let evicted = before - state.entries.len();
        state.evictions += evicted as u64;
        debug!(evicted, remaining = state.entries.len(), "Cache pruned");
    }

    /// Removes one entry
    pub async fn invalidate(&self, key: &str) -> bool {
        self.state.lock().await.entries.shift_remove(key).is_some()
    }

    /// Drops every expired entry and returns how many were removed
    pub async fn prune_expired(&self) -> usize {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_valid_at(now));
        let removed = before - state.entries.len();
        state.evictions += removed as u64;
        removed
    }

    pub async fn clear(&self) {
        self.state.lock().await.entries.clear();
    }

    /// Number of stored entries, expired ones included until they are pruned
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        CacheStats {
            entries: state.entries.len(),
            capacity: self.capacity,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
        }
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

/// Cache counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}
