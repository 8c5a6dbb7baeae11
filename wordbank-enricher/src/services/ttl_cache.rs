//! Time-bounded response cache
//!
//! A small TTL map with an explicit eviction callback, decoupled from any
//! request-handling framework. There is no background timer: expired
//! entries are dropped on access or by an explicit `purge_expired` sweep,
//! so the caller controls when eviction work happens.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

type EvictionCallback<K, V> = Box<dyn Fn(&K, &V) + Send + Sync>;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// TTL-bounded map. Not internally synchronized; wrap in a mutex for shared
/// use.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, CacheEntry<V>>,
    on_evict: Option<EvictionCallback<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
            on_evict: None,
        }
    }

    /// Register a callback invoked for every entry evicted on expiry
    pub fn with_eviction_callback<F>(ttl: Duration, on_evict: F) -> Self
    where
        F: Fn(&K, &V) + Send + Sync + 'static,
    {
        Self {
            ttl,
            entries: HashMap::new(),
            on_evict: Some(Box::new(on_evict)),
        }
    }

    /// Insert or replace an entry, resetting its TTL
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Fetch a live entry; an expired one is evicted and not returned
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.inserted_at.elapsed() >= self.ttl,
            None => return None,
        };

        if expired {
            if let Some(entry) = self.entries.remove(key) {
                if let Some(on_evict) = &self.on_evict {
                    on_evict(key, &entry.value);
                }
            }
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Drop every expired entry, invoking the eviction callback for each.
    ///
    /// Returns the number of entries evicted.
    pub fn purge_expired(&mut self) -> usize {
        let ttl = self.ttl;
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.inserted_at.elapsed() >= ttl)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(entry) = self.entries.remove(key) {
                if let Some(on_evict) = &self.on_evict {
                    on_evict(key, &entry.value);
                }
            }
        }

        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn live_entries_are_returned() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("cet4", 1);
        assert_eq!(cache.get(&"cet4"), Some(1));
        assert_eq!(cache.get(&"cet6"), None);
    }

    #[test]
    fn expired_entries_are_not_returned() {
        let mut cache = TtlCache::new(Duration::from_millis(20));
        cache.insert("cet4", 1);
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&"cet4"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_resets_the_ttl() {
        let mut cache = TtlCache::new(Duration::from_millis(60));
        cache.insert("cet4", 1);
        thread::sleep(Duration::from_millis(40));
        cache.insert("cet4", 2);
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&"cet4"), Some(2));
    }

    #[test]
    fn purge_invokes_eviction_callback() {
        let evicted = Arc::new(AtomicUsize::new(0));
        let counter = evicted.clone();
        let mut cache = TtlCache::with_eviction_callback(
            Duration::from_millis(20),
            move |_key: &&str, _value: &i32| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        cache.insert("cet4", 1);
        cache.insert("cet6", 2);
        thread::sleep(Duration::from_millis(40));
        cache.insert("gaokao", 3);

        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(evicted.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"gaokao"), Some(3));
    }
}
