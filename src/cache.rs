use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Default maximum number of entries held per cache table.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Bounded map from input text to derived text with least-recently-used
/// eviction.
///
/// A capacity of zero disables storage entirely; every lookup is a miss.
#[derive(Debug)]
pub struct LruMap {
    capacity: usize,
    entries: HashMap<String, (String, u64)>,
    recency: BTreeMap<u64, String>,
    tick: u64,
}

impl LruMap {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached value and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let (value, stamp) = self.entries.get_mut(key)?;
        self.tick += 1;
        let tick = self.tick;
        self.recency.remove(&*stamp);
        *stamp = tick;
        self.recency.insert(tick, key.to_string());
        Some(value.clone())
    }

    /// Stores a value, evicting the least recently used entry when full.
    pub fn insert(&mut self, key: String, value: String) {
        if self.capacity == 0 {
            return;
        }
        self.tick += 1;
        let tick = self.tick;

        if let Some((stored, stamp)) = self.entries.get_mut(&key) {
            self.recency.remove(&*stamp);
            *stored = value;
            *stamp = tick;
            self.recency.insert(tick, key);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some((_, oldest)) = self.recency.pop_first() {
                self.entries.remove(&oldest);
            }
        }
        self.recency.insert(tick, key.clone());
        self.entries.insert(key, (value, tick));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }
}

/// Hit and miss counters of a [`ReconcileCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoises text normalisation and price extraction, keyed by the exact
/// input text. Shared by every worker of a reconciler.
///
/// Cached values are always the output of the wrapped function for the same
/// input, so hits and misses differ only in cost.
#[derive(Debug)]
pub struct ReconcileCache {
    normalized: Mutex<LruMap>,
    prices: Mutex<LruMap>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ReconcileCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            normalized: Mutex::new(LruMap::new(capacity)),
            prices: Mutex::new(LruMap::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Normalised text for `markup`, computed with `compute` on a miss.
    pub fn normalized(&self, markup: &str, compute: impl FnOnce(&str) -> String) -> String {
        self.lookup(&self.normalized, markup, compute)
    }

    /// Price set for `text`, computed with `compute` on a miss.
    pub fn prices(&self, text: &str, compute: impl FnOnce(&str) -> String) -> String {
        self.lookup(&self.prices, text, compute)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Entries currently held across both tables.
    pub fn len(&self) -> usize {
        self.normalized.lock().len() + self.prices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.normalized.lock().clear();
        self.prices.lock().clear();
    }

    fn lookup(
        &self,
        table: &Mutex<LruMap>,
        key: &str,
        compute: impl FnOnce(&str) -> String,
    ) -> String {
        if let Some(value) = table.lock().get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        // computed outside the lock; racing workers store identical values
        let value = compute(key);
        table.lock().insert(key.to_string(), value.clone());
        value
    }
}

impl Default for ReconcileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
