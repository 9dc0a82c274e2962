//! Cache Store Module
//!
//! Mutex-guarded wrapper around the LRU cache with lazy construction.

use parking_lot::Mutex;

use crate::cache::{ByteView, EvictionCallback, LruCache};

struct Inner {
    lru: Option<LruCache>,
    /// Handed to the LRU cache when it is first constructed
    on_evicted: Option<EvictionCallback>,
}

// == Cache Store ==
/// Thread-safe cache store, the only component touching [`LruCache`].
///
/// The underlying store is allocated on the first `add`, so groups that are
/// registered but never populated commit no storage. The byte budget is
/// fixed at construction time.
pub struct CacheStore {
    max_bytes: usize,
    inner: Mutex<Inner>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store with the given byte budget and optional eviction
    /// callback.
    pub fn new(max_bytes: usize, on_evicted: Option<EvictionCallback>) -> Self {
        Self {
            max_bytes,
            inner: Mutex::new(Inner {
                lru: None,
                on_evicted,
            }),
        }
    }

    // == Add ==
    /// Stores a value, constructing the LRU cache on first use.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock();
        if inner.lru.is_none() {
            let callback = inner.on_evicted.take();
            inner.lru = Some(LruCache::new(self.max_bytes, callback));
        }
        if let Some(lru) = inner.lru.as_mut() {
            lru.add(key, value);
        }
    }

    // == Get ==
    /// Looks up a value; an unconstructed store reports a miss without
    /// allocating.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        inner.lru.as_mut()?.get(key).cloned()
    }

    // == Length ==
    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        let inner = self.inner.lock();
        inner.lru.as_ref().map_or(0, |lru| lru.len())
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("max_bytes", &self.max_bytes)
            .field("entries", &self.len())
            .finish()
    }
}
