use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

struct TimedEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Generic in-memory cache tier: TTL expiry on read, size-bounded eviction
/// of the oldest entry on insert. No background sweeper is needed at this
/// tier; expired entries are removed inline by the `get` that observes them.
///
/// Uses `tokio::time::Instant` so tests can drive expiry with the paused
/// clock.
pub struct MemoryCache<K, V> {
    entries: HashMap<K, TimedEntry<V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        MemoryCache {
            entries: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Read-triggered expiry: an entry older than the TTL is a miss and is
    /// removed inline.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
            None => return None,
        };

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|e| e.value.clone())
    }

    /// Last-writer-wins. Inserting a new key past the size cap first evicts
    /// the single oldest entry (amortized O(n), acceptable at the cap sizes
    /// used here).
    pub fn insert(&mut self, key: K, value: V) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            TimedEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|e| e.value)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep_expired(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.inserted_at)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
