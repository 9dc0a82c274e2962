//! LRU Cache Module
//!
//! Byte-budgeted least-recently-used store with an eviction callback.

use std::collections::{HashMap, VecDeque};

use crate::cache::ByteView;

/// Callback invoked with the key and value of every evicted entry.
pub type EvictionCallback = Box<dyn Fn(&str, &ByteView) + Send>;

// == LRU Cache ==
/// Capacity-bounded key/value store with byte-size accounting.
///
/// Keys are tracked in a recency order where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Accounting charges `key.len() + value.len()` per entry; a `max_bytes` of
/// zero means unbounded. No internal locking: callers serialize access
/// (see [`CacheStore`](crate::cache::CacheStore)).
pub struct LruCache {
    /// Key-value storage
    entries: HashMap<String, ByteView>,
    /// Order of keys by access time
    order: VecDeque<String>,
    /// Bytes currently accounted for
    used_bytes: usize,
    /// Byte budget, 0 = unbounded
    max_bytes: usize,
    /// Invoked once per evicted entry
    on_evicted: Option<EvictionCallback>,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty cache with the given byte budget.
    pub fn new(max_bytes: usize, on_evicted: Option<EvictionCallback>) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            used_bytes: 0,
            max_bytes,
            on_evicted,
        }
    }

    // == Get ==
    /// Looks up a key, promoting it to most recently used on a hit.
    ///
    /// Misses have no side effect on the accounting.
    pub fn get(&mut self, key: &str) -> Option<&ByteView> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.touch(key);
        self.entries.get(key)
    }

    // == Add ==
    /// Inserts or replaces a value and enforces the byte budget.
    ///
    /// Replacing an existing key adjusts the accounting by the value-size
    /// delta only; the key length is charged once, on first insert. After
    /// insertion, least-recently-used entries are evicted until the budget
    /// holds again.
    ///
    /// # Panics
    /// Panics if a single entry exceeds `max_bytes` (the eviction loop
    /// would otherwise empty the store without ever getting under budget).
    pub fn add(&mut self, key: &str, value: ByteView) {
        match self.entries.get_mut(key) {
            Some(existing) => {
                self.used_bytes -= existing.len();
                self.used_bytes += value.len();
                *existing = value;
                self.touch(key);
            }
            None => {
                self.used_bytes += key.len() + value.len();
                self.entries.insert(key.to_string(), value);
                self.order.push_front(key.to_string());
            }
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if self.entries.is_empty() {
                panic!("cache entry larger than the configured byte budget");
            }
            self.remove_oldest();
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, firing the eviction callback.
    pub fn remove_oldest(&mut self) {
        if let Some(key) = self.order.pop_back() {
            if let Some(value) = self.entries.remove(&key) {
                self.used_bytes -= key.len() + value.len();
                if let Some(callback) = &self.on_evicted {
                    callback(&key, &value);
                }
            }
        }
    }

    // == Clear ==
    /// Drops all entries, firing the eviction callback for each.
    pub fn clear(&mut self) {
        if let Some(callback) = &self.on_evicted {
            for (key, value) in &self.entries {
                callback(key, value);
            }
        }
        self.entries.clear();
        self.order.clear();
        self.used_bytes = 0;
    }

    // == Length ==
    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Used Bytes ==
    /// Returns the bytes currently accounted for.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Marks a key as most recently used.
    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.to_string());
    }
}

impl std::fmt::Debug for LruCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("entries", &self.entries.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_get_hit_and_miss() {
        let mut lru = LruCache::new(0, None);
        lru.add("key1", ByteView::from("1234"));

        assert_eq!(lru.get("key1").map(|v| v.as_str().into_owned()), Some("1234".to_string()));
        assert!(lru.get("key2").is_none());
    }

    #[test]
    fn test_remove_oldest_on_budget_pressure() {
        let (k1, k2, k3) = ("key1", "key2", "k3");
        let (v1, v2, v3) = ("value1", "value2", "v3");
        // Exactly enough room for the first two entries
        let cap = k1.len() + v1.len() + k2.len() + v2.len();
        let mut lru = LruCache::new(cap, None);

        lru.add(k1, ByteView::from(v1));
        lru.add(k2, ByteView::from(v2));
        lru.add(k3, ByteView::from(v3));

        // The oldest entry (key1), not an arbitrary one, was evicted
        assert!(lru.get("key1").is_none());
        assert_eq!(lru.len(), 2);
        assert!(lru.get("key2").is_some());
        assert!(lru.get("k3").is_some());
    }

    #[test]
    fn test_get_promotes_entry() {
        let (k1, k2) = ("key1", "key2");
        let (v1, v2) = ("value1", "value2");
        let cap = k1.len() + v1.len() + k2.len() + v2.len();
        let mut lru = LruCache::new(cap, None);

        lru.add(k1, ByteView::from(v1));
        lru.add(k2, ByteView::from(v2));

        // Touch key1 so key2 becomes the eviction candidate
        lru.get(k1);
        lru.add("k3", ByteView::from("v3"));

        assert!(lru.get("key1").is_some());
        assert!(lru.get("key2").is_none());
    }

    #[test]
    fn test_eviction_callback_fires_exactly_once() {
        let evicted: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = evicted.clone();
        let callback: EvictionCallback = Box::new(move |key, _value| {
            sink.lock().push(key.to_string());
        });

        let mut lru = LruCache::new(14, Some(callback));
        lru.add("key1", ByteView::from("123456"));
        lru.add("k2", ByteView::from("k2"));
        lru.add("k3", ByteView::from("k3"));
        lru.add("k4", ByteView::from("k4"));

        // Only the very first insert was pushed out
        assert_eq!(*evicted.lock(), vec!["key1".to_string()]);
        assert_eq!(lru.len(), 3);
    }

    #[test]
    fn test_overwrite_does_not_fire_callback() {
        let count = Arc::new(Mutex::new(0usize));
        let sink = count.clone();
        let callback: EvictionCallback = Box::new(move |_key, _value| {
            *sink.lock() += 1;
        });

        let mut lru = LruCache::new(0, Some(callback));
        lru.add("key", ByteView::from("old"));
        lru.add("key", ByteView::from("new"));

        assert_eq!(*count.lock(), 0);
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_overwrite_adjusts_accounting_by_delta() {
        let mut lru = LruCache::new(10, None);
        lru.add("key", ByteView::from("1"));
        lru.add("key", ByteView::from("111"));

        // The key length is charged once, not per overwrite
        assert_eq!(lru.used_bytes(), "key".len() + "111".len());
    }

    #[test]
    fn test_unbounded_when_budget_is_zero() {
        let mut lru = LruCache::new(0, None);
        for i in 0..128 {
            lru.add(&format!("key{}", i), ByteView::from("value"));
        }
        assert_eq!(lru.len(), 128);
    }

    #[test]
    #[should_panic(expected = "byte budget")]
    fn test_oversized_entry_is_fatal() {
        let mut lru = LruCache::new(4, None);
        lru.add("key1", ByteView::from("too large to ever fit"));
    }

    #[test]
    fn test_clear_fires_callback_for_all() {
        let count = Arc::new(Mutex::new(0usize));
        let sink = count.clone();
        let callback: EvictionCallback = Box::new(move |_key, _value| {
            *sink.lock() += 1;
        });

        let mut lru = LruCache::new(0, Some(callback));
        lru.add("a", ByteView::from("1"));
        lru.add("b", ByteView::from("2"));
        lru.clear();

        assert_eq!(*count.lock(), 2);
        assert!(lru.is_empty());
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_remove_oldest_on_empty_is_noop() {
        let mut lru = LruCache::new(0, None);
        lru.remove_oldest();
        assert_eq!(lru.len(), 0);
    }
}
