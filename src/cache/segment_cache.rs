use crate::cache::{CacheStats, MemoryCache};
use crate::constants::SEGMENT_KEY_QUANT_FACTOR;
use crate::models::Coordinates;
use crate::providers::WalkingSegment;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Cache key for a walking segment: both endpoints quantized to ~4 decimal
/// degrees (~10 m). Two physically distinct queries within 10 m of each
/// other collide intentionally — hit rate is worth more than positional
/// precision at walking scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    from_lat_q: i64,
    from_lng_q: i64,
    to_lat_q: i64,
    to_lng_q: i64,
}

impl SegmentKey {
    pub fn new(from: &Coordinates, to: &Coordinates) -> Self {
        SegmentKey {
            from_lat_q: quantize(from.lat),
            from_lng_q: quantize(from.lng),
            to_lat_q: quantize(to.lat),
            to_lng_q: quantize(to.lng),
        }
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seg:{}:{}:{}:{}",
            self.from_lat_q, self.from_lng_q, self.to_lat_q, self.to_lng_q
        )
    }
}

fn quantize(degrees: f64) -> i64 {
    (degrees * SEGMENT_KEY_QUANT_FACTOR).round() as i64
}

/// In-memory walking-segment cache. Bounded, TTL'd, safe to share across
/// concurrent orchestrations: reads and writes are short synchronous
/// critical sections, and cached values are immutable computed results, so
/// last-writer-wins is correct.
pub struct SegmentCache {
    inner: Mutex<MemoryCache<SegmentKey, WalkingSegment>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SegmentCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        SegmentCache {
            inner: Mutex::new(MemoryCache::new(ttl, max_entries)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &SegmentKey) -> Option<WalkingSegment> {
        let result = self.lock().get(key);
        match &result {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Segment cache hit: {}", key);
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Segment cache miss: {}", key);
            }
        }
        result
    }

    pub fn insert(&self, key: SegmentKey, segment: WalkingSegment) {
        self.lock().insert(key, segment);
    }

    pub fn sweep_expired(&self) -> usize {
        let removed = self.lock().sweep_expired();
        if removed > 0 {
            tracing::debug!("Segment cache sweep removed {} expired entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::from_counts(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.len() as u64,
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryCache<SegmentKey, WalkingSegment>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
