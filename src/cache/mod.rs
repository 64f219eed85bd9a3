pub mod disk;
pub mod memory;
pub mod segment_cache;

pub use disk::{CacheDomain, DiskCacheConfig, DiskCacheStore};
pub use memory::MemoryCache;
pub use segment_cache::{SegmentCache, SegmentKey};

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A cached value with its creation timestamp. This is the unit the disk
/// tier serializes; the TTL itself is a per-domain property, not stored with
/// the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub value: V,
    /// Unix seconds at creation time.
    pub created_at: u64,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V) -> Self {
        CacheEntry {
            value,
            created_at: unix_now(),
        }
    }

    /// An entry is visible to readers only while `now - created_at < ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        unix_now().saturating_sub(self.created_at) >= ttl.as_secs()
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Hit/miss counters for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entries: u64,
}

impl CacheStats {
    pub fn from_counts(hits: u64, misses: u64, entries: u64) -> Self {
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            entries,
        }
    }
}
