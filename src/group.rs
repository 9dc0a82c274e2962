//! Group Module
//!
//! A Group is a cache namespace: it owns the local store and coalescer,
//! consults peers for keys it does not own, and falls back to the
//! application-supplied loader.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, CacheStore, StatsSnapshot};
use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker, PeerRequest};
use crate::singleflight::SingleFlight;

// == Loader Trait ==
/// Resolves a key from the authoritative data source on a full cache miss.
///
/// Supplied by the embedding application; invoked at most once per
/// outstanding uncoalesced miss per key.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> Result<Vec<u8>>;
}

// == Group ==
/// A named cache namespace with its full lookup pipeline.
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: CacheStore,
    /// Registered at most once; fixed after startup
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: SingleFlight,
    stats: Arc<CacheStats>,
}

impl Group {
    fn new(name: &str, max_bytes: usize, loader: Arc<dyn Loader>) -> Arc<Self> {
        let stats = Arc::new(CacheStats::new());
        let eviction_stats = stats.clone();
        let main_cache = CacheStore::new(
            max_bytes,
            Some(Box::new(move |_key: &str, _value: &ByteView| {
                eviction_stats.record_eviction();
            })),
        );

        Arc::new(Self {
            name: name.to_string(),
            loader,
            main_cache,
            peers: OnceLock::new(),
            flight: SingleFlight::new(),
            stats,
        })
    }

    /// Returns the group's namespace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Wires the peer picker into the group.
    ///
    /// # Panics
    /// Panics if called more than once: a group's peer topology is fixed
    /// after startup, so a second registration is a programming error.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group '{}'", self.name);
        }
    }

    // == Get ==
    /// Resolves a key: local cache, then a coalesced peer fetch or local
    /// load.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        self.stats.record_get();

        if let Some(view) = self.main_cache.get(key) {
            debug!(group = %self.name, key, "cache hit");
            self.stats.record_hit();
            return Ok(view);
        }

        // Concurrent misses for the same key resolve through one load
        self.flight.run(key, || self.load(key)).await
    }

    /// Uncached load path: try the owning peer, fall back to the local
    /// loader. Peer failures are recovered, never propagated.
    async fn load(&self, key: &str) -> Result<ByteView> {
        if let Some(picker) = self.peers.get() {
            if let Some(peer) = picker.pick_peer(key) {
                match self.fetch_from_peer(peer.as_ref(), key).await {
                    Ok(view) => {
                        self.stats.record_peer_load();
                        return Ok(view);
                    }
                    Err(err) => {
                        self.stats.record_peer_error();
                        warn!(group = %self.name, key, %err, "peer fetch failed, loading locally");
                    }
                }
            }
        }
        self.load_locally(key).await
    }

    /// Runs the application loader and populates the local cache.
    async fn load_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.loader.load(key).await?;
        let view = ByteView::new(bytes);
        // Only locally-loaded values enter the cache; each key is cached on
        // exactly one node
        self.main_cache.add(key, view.clone());
        self.stats.record_local_load();
        Ok(view)
    }

    async fn fetch_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let request = PeerRequest {
            group: self.name.clone(),
            key: key.to_string(),
        };
        let response = peer.get(&request).await?;
        Ok(ByteView::new(response.value))
    }

    // == Stats ==
    /// Returns a snapshot of the group's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group").field("name", &self.name).finish()
    }
}

// == Group Registry ==
/// Owned table of named groups, shared between the servers.
///
/// Registration is last-writer-wins, mirroring a process-wide named-instance
/// table; lookups are read-shared.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates and registers a namespace; a duplicate name replaces the
    /// previous entry.
    pub fn new_group(
        &self,
        name: &str,
        max_bytes: usize,
        loader: Arc<dyn Loader>,
    ) -> Arc<Group> {
        let group = Group::new(name, max_bytes, loader);
        self.groups.write().insert(name.to_string(), group.clone());
        group
    }

    // == Get Group ==
    /// Looks up a namespace by name.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }
}
