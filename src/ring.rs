//! Consistent Hash Ring Module
//!
//! Maps keys to node addresses with virtual replicas to smooth the load
//! distribution of a small node set. Reads are lock-free: the ring state is
//! published as an immutable snapshot behind an atomic pointer swap, so
//! concurrent readers never observe a partially-updated ring. Writes are
//! serialized and follow a copy-then-publish discipline.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

/// Pluggable hash over the UTF-8 bytes of ring inputs.
pub type HashFn = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Virtual replicas per node used by the peer pool.
pub const DEFAULT_REPLICAS: usize = 50;

/// One published ring state: sorted virtual positions plus the mapping from
/// each position to its owning node.
#[derive(Debug, Default, Clone)]
struct RingState {
    positions: Vec<u32>,
    owners: HashMap<u32, String>,
}

// == Hash Ring ==
/// Consistent hash ring over node address strings.
pub struct HashRing {
    replicas: usize,
    hash: HashFn,
    /// Serializes writers; readers never take it
    write_lock: Mutex<()>,
    state: ArcSwap<RingState>,
}

impl HashRing {
    // == Constructor ==
    /// Creates a ring using the default CRC-32 hash.
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, Box::new(|data| crc32fast::hash(data)))
    }

    /// Creates a ring with a custom hash function.
    pub fn with_hasher(replicas: usize, hash: HashFn) -> Self {
        Self {
            replicas,
            hash,
            write_lock: Mutex::new(()),
            state: ArcSwap::from_pointee(RingState::default()),
        }
    }

    // == Add ==
    /// Registers nodes on the ring, `replicas` virtual positions each.
    ///
    /// The updated state is published as one atomic snapshot.
    pub fn add<S: AsRef<str>>(&self, nodes: &[S]) {
        let _guard = self.write_lock.lock();
        let mut next = RingState::clone(&self.state.load());

        for node in nodes {
            let node = node.as_ref();
            for replica in 0..self.replicas {
                let position = self.virtual_position(replica, node);
                next.positions.push(position);
                next.owners.insert(position, node.to_string());
            }
        }
        next.positions.sort_unstable();

        self.state.store(Arc::new(next));
    }

    // == Remove ==
    /// Removes a node and all of its virtual positions.
    ///
    /// Uses the same copy-then-publish discipline as `add`: readers see the
    /// old ring or the new ring, never a half-edited one.
    pub fn remove(&self, node: &str) {
        let _guard = self.write_lock.lock();
        let mut next = RingState::clone(&self.state.load());

        for replica in 0..self.replicas {
            let position = self.virtual_position(replica, node);
            if let Ok(index) = next.positions.binary_search(&position) {
                next.positions.remove(index);
            }
            next.owners.remove(&position);
        }

        self.state.store(Arc::new(next));
    }

    // == Get ==
    /// Returns the node owning `key`, or `None` on an empty ring.
    ///
    /// Picks the first virtual position clockwise from `hash(key)`, wrapping
    /// past the largest position back to the smallest.
    pub fn get(&self, key: &str) -> Option<String> {
        let state = self.state.load();
        if state.positions.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let index = state.positions.partition_point(|&position| position < hash);
        let position = state.positions[index % state.positions.len()];
        state.owners.get(&position).cloned()
    }

    /// Returns true if no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.state.load().positions.is_empty()
    }

    fn virtual_position(&self, replica: usize, node: &str) -> u32 {
        (self.hash)(format!("{}{}", replica, node).as_bytes())
    }
}

impl std::fmt::Debug for HashRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("positions", &self.state.load().positions.len())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    /// Ring with a hash that parses the input as a decimal number, making
    /// every virtual position predictable.
    fn numeric_ring() -> HashRing {
        HashRing::with_hasher(
            3,
            Box::new(|data| {
                std::str::from_utf8(data)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0)
            }),
        )
    }

    #[test]
    fn test_get_picks_clockwise_owner() {
        let ring = numeric_ring();
        // Virtual positions: 02/12/22, 04/14/24, 06/16/26
        ring.add(&["6", "4", "2"]);

        let cases = vec![("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, expected) in cases {
            assert_eq!(ring.get(key).as_deref(), Some(expected), "key {}", key);
        }
    }

    #[test]
    fn test_added_node_takes_over_keys() {
        let ring = numeric_ring();
        ring.add(&["6", "4", "2"]);
        assert_eq!(ring.get("27").as_deref(), Some("2"));

        // 8 adds positions 08/18/28; 27 now lands on 28
        ring.add(&["8"]);
        assert_eq!(ring.get("27").as_deref(), Some("8"));
    }

    #[test]
    fn test_removed_node_never_returned() {
        let ring = numeric_ring();
        ring.add(&["6", "4", "2", "8"]);
        assert_eq!(ring.get("27").as_deref(), Some("8"));

        ring.remove("8");
        assert_eq!(ring.get("27").as_deref(), Some("2"));
        for key in ["1", "7", "13", "25", "99"] {
            assert_ne!(ring.get(key).as_deref(), Some("8"));
        }
    }

    #[test]
    fn test_empty_ring_returns_none() {
        let ring = HashRing::new(DEFAULT_REPLICAS);
        assert!(ring.is_empty());
        assert_eq!(ring.get("anything"), None);
    }

    #[test]
    fn test_default_hash_is_deterministic() {
        let ring = HashRing::new(DEFAULT_REPLICAS);
        ring.add(&["node-a", "node-b", "node-c"]);

        let first = ring.get("some-key");
        assert!(first.is_some());
        for _ in 0..32 {
            assert_eq!(ring.get("some-key"), first);
        }
    }

    #[test]
    fn test_remove_then_empty() {
        let ring = HashRing::new(4);
        ring.add(&["only"]);
        assert_eq!(ring.get("k").as_deref(), Some("only"));

        ring.remove("only");
        assert!(ring.is_empty());
        assert_eq!(ring.get("k"), None);
    }

    #[test]
    fn test_readers_see_complete_snapshots() {
        use std::sync::Arc;

        let ring = Arc::new(HashRing::new(16));
        ring.add(&["seed"]);

        let reader = {
            let ring = ring.clone();
            std::thread::spawn(move || {
                for _ in 0..10_000 {
                    // Every read resolves to a registered node, never a
                    // half-updated state
                    assert!(ring.get("key").is_some());
                }
            })
        };
        for i in 0..64 {
            ring.add(&[format!("node-{}", i)]);
        }
        reader.join().unwrap();
    }
}
