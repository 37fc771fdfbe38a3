use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Thread-safe TTL cache keyed by uppercased ticker.
///
/// A zero TTL disables the cache: nothing is stored and every lookup misses.
pub struct TickerCache<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V: Clone> TickerCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Fresh value for `ticker`, evicting it if stale.
    pub fn get(&self, ticker: &str) -> Option<V> {
        let key = ticker.to_uppercase();
        let entry = self.entries.get(&key)?;
        if entry.expires_at > Instant::now() {
            return Some(entry.value.clone());
        }
        drop(entry);
        self.entries.remove(&key);
        None
    }

    pub fn insert(&self, ticker: &str, value: V) {
        if !self.is_enabled() {
            return;
        }
        self.entries.insert(
            ticker.to_uppercase(),
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Entry count, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
