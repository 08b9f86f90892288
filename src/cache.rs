use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

/// Bounded, thread-safe LRU cache. A capacity of zero disables caching entirely,
/// which keeps tests free of memoization effects.
pub struct Cache<K, V> {
    inner: Option<Mutex<LruCache<K, V>>>,
}

impl<K: Hash + Eq, V: Clone> Cache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.lock()?;
        guard.get(key).cloned()
    }

    /// Recomputation is idempotent, so concurrent writers of the same key are harmless.
    pub fn insert(&self, key: K, value: V) {
        if let Some(mut guard) = self.lock() {
            guard.put(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(mut guard) = self.lock() {
            guard.clear();
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, LruCache<K, V>>> {
        self.inner
            .as_ref()
            .map(|mutex| mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let cache: Cache<String, u32> = Cache::new(2);
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.get(&"a".to_string()), Some(1));

        cache.insert("c".to_string(), 3);
        assert_eq!(cache.get(&"b".to_string()), None);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache: Cache<String, u32> = Cache::new(0);
        assert!(!cache.is_enabled());
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), None);
        assert!(cache.is_empty());
    }
}
