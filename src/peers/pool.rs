//! Peer Pool Module
//!
//! Maps keys to peer nodes via the consistent hash ring and keeps one HTTP
//! client binding per peer.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::peers::{HttpGetter, PeerGetter, PeerPicker};
use crate::ring::{HashRing, DEFAULT_REPLICAS};

/// Path prefix all peer protocol requests share.
pub const DEFAULT_BASE_PATH: &str = "/_peercache/";

/// Ring and client bindings, always replaced together.
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// Peer picker over a static peer set.
///
/// `set_peers` replaces the ring and the binding map wholesale; readers see
/// the fully-old or fully-new pair, never a mix.
pub struct HttpPool {
    /// This node's own address, e.g. `http://localhost:8001`
    self_addr: String,
    base_path: String,
    client: reqwest::Client,
    state: RwLock<PoolState>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node at `self_addr` with the default base
    /// path and HTTP client.
    pub fn new(self_addr: &str) -> Self {
        Self::with_client(self_addr, reqwest::Client::new())
    }

    /// Creates a pool with a caller-configured HTTP client (timeouts,
    /// pooling limits).
    pub fn with_client(self_addr: &str, client: reqwest::Client) -> Self {
        Self {
            self_addr: self_addr.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            client,
            state: RwLock::new(PoolState {
                ring: HashRing::new(DEFAULT_REPLICAS),
                getters: HashMap::new(),
            }),
        }
    }

    /// Returns the protocol base path served by this pool.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // == Set Peers ==
    /// Replaces the peer set, rebuilding the ring and one client binding
    /// per address. Prior bindings are discarded.
    pub fn set_peers<S: AsRef<str>>(&self, peers: &[S]) {
        let ring = HashRing::new(DEFAULT_REPLICAS);
        ring.add(peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let peer = peer.as_ref().to_string();
                let base_url = format!("{}{}", peer, self.base_path);
                let getter = Arc::new(HttpGetter::new(self.client.clone(), base_url));
                (peer, getter)
            })
            .collect();

        *self.state.write() = PoolState { ring, getters };
    }
}

impl PeerPicker for HttpPool {
    // == Pick Peer ==
    /// Resolves the owning node for `key`; returns `None` when this node is
    /// authoritative or no peers are registered.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let owner = state.ring.get(key)?;
        if owner == self.self_addr {
            return None;
        }
        debug!(peer = %owner, key, "picked remote peer");
        state
            .getters
            .get(&owner)
            .map(|getter| getter.clone() as Arc<dyn PeerGetter>)
    }
}

impl std::fmt::Debug for HttpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPool")
            .field("self_addr", &self.self_addr)
            .field("base_path", &self.base_path)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const PEERS: [&str; 3] = [
        "http://localhost:8001",
        "http://localhost:8002",
        "http://localhost:8003",
    ];

    #[test]
    fn test_empty_pool_picks_nobody() {
        let pool = HttpPool::new("http://localhost:8001");
        assert!(pool.pick_peer("Tom").is_none());
    }

    #[test]
    fn test_pick_is_deterministic() {
        let pool = HttpPool::new("http://localhost:9999");
        pool.set_peers(&PEERS);

        let first = pool.pick_peer("Tom").is_some();
        assert!(first, "a non-member node must always resolve to a peer");
        for _ in 0..16 {
            assert_eq!(pool.pick_peer("Tom").is_some(), first);
        }
    }

    #[test]
    fn test_own_keys_are_local() {
        // Each node, asked about every key, reports "remote" exactly when
        // some other node owns it; exactly one node answers "local"
        let pools: Vec<HttpPool> = PEERS.iter().map(|addr| HttpPool::new(addr)).collect();
        for pool in &pools {
            pool.set_peers(&PEERS);
        }

        for key in ["Tom", "Jack", "Sam", "alpha", "beta"] {
            let locals = pools
                .iter()
                .filter(|pool| pool.pick_peer(key).is_none())
                .count();
            assert_eq!(locals, 1, "key '{}' must have exactly one owner", key);
        }
    }

    #[test]
    fn test_set_peers_replaces_bindings() {
        let keys = ["Tom", "Jack", "Sam", "alpha", "beta", "gamma", "delta"];

        let pool = HttpPool::new("http://localhost:8001");
        pool.set_peers(&PEERS);
        let remote_before = keys.iter().filter(|k| pool.pick_peer(k).is_some()).count();
        assert!(remote_before > 0, "some keys must live on other nodes");

        // Shrinking to just this node leaves no remote peers at all
        pool.set_peers(&["http://localhost:8001"]);
        for key in keys {
            assert!(pool.pick_peer(key).is_none());
        }
    }
}
