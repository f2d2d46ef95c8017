//! Decoded accessor cache.
//!
//! Primitives frequently share accessors (indices, skinning weights,
//! animation inputs); caching by accessor index decodes each once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::data::Decoded;
use crate::util::Result;

/// Thread-safe cache of decoded accessors keyed by accessor index.
///
/// Uses `parking_lot::RwLock` for non-poisoning locks and `AtomicUsize`
/// for lock-free size tracking.
pub struct AccessorCache {
    cache: RwLock<HashMap<usize, Arc<Decoded>>>,
    /// Maximum cache size in bytes of decoded components.
    max_size: usize,
    current_size: AtomicUsize,
}

impl AccessorCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            max_size,
            current_size: AtomicUsize::new(0),
        }
    }

    /// Create a cache with default size (64 MB).
    pub fn default_size() -> Self {
        Self::new(64 * 1024 * 1024)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Arc<Decoded>> {
        self.cache.read().get(&index).cloned()
    }

    /// Cached value for `index`, decoding with `decode` on a miss.
    ///
    /// Decode failures are returned and not cached.
    pub fn get_or_decode(&self, index: usize, decode: impl FnOnce() -> Result<Decoded>) -> Result<Arc<Decoded>> {
        if let Some(hit) = self.get(index) {
            return Ok(hit);
        }
        let decoded = Arc::new(decode()?);
        self.insert(index, Arc::clone(&decoded));
        Ok(decoded)
    }

    /// Insert a decoded accessor. Entries larger than the cache are skipped.
    pub fn insert(&self, index: usize, decoded: Arc<Decoded>) {
        let size = decoded.byte_size();
        if size > self.max_size {
            return;
        }

        let current = self.current_size.load(Ordering::Relaxed);
        if current + size > self.max_size {
            self.evict_some();
        }

        let mut cache = self.cache.write();
        if cache.contains_key(&index) {
            return;
        }
        cache.insert(index, decoded);
        self.current_size.fetch_add(size, Ordering::Relaxed);
    }

    /// Evict approximately half of the cache.
    fn evict_some(&self) {
        let mut cache = self.cache.write();
        let keys: Vec<usize> = cache.keys().copied().collect();
        let evict_count = keys.len().div_ceil(2);

        let mut evicted_size = 0;
        for key in keys.into_iter().take(evict_count) {
            if let Some(entry) = cache.remove(&key) {
                evicted_size += entry.byte_size();
            }
        }
        tracing::debug!(evicted = evict_count, bytes = evicted_size, "Evicted cached accessors");

        let _ = self.current_size.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| {
            Some(x.saturating_sub(evicted_size))
        });
    }

    pub fn clear(&self) {
        let mut cache = self.cache.write();
        cache.clear();
        self.current_size.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cache size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.current_size.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for AccessorCache {
    fn default() -> Self {
        Self::default_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::ComponentData;
    use crate::util::{AccessorType, ComponentType, Error};

    fn scalars(n: usize) -> Decoded {
        Decoded::new(AccessorType::Scalar, ComponentType::Uint8, ComponentData::U8(vec![0; n]))
    }

    #[test]
    fn test_cache_get_or_decode() {
        let cache = AccessorCache::new(1024);
        let mut calls = 0;
        for _ in 0..3 {
            let d = cache
                .get_or_decode(4, || {
                    calls += 1;
                    Ok(scalars(5))
                })
                .unwrap();
            assert_eq!(d.len(), 5);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.size(), 5);
    }

    #[test]
    fn test_cache_errors_not_cached() {
        let cache = AccessorCache::new(1024);
        let result = cache.get_or_decode(0, || Err(Error::MissingBuffer(0)));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_eviction() {
        let cache = AccessorCache::new(50);
        for i in 0..10 {
            cache.insert(i, Arc::new(scalars(10)));
        }
        assert!(cache.len() <= 5);
        assert!(cache.size() <= 50);
    }

    #[test]
    fn test_cache_skip_large() {
        let cache = AccessorCache::new(100);
        cache.insert(0, Arc::new(scalars(200)));
        assert!(cache.get(0).is_none());

        cache.insert(1, Arc::new(scalars(10)));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.size(), 0);
    }
}
