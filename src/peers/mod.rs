//! Peers Module
//!
//! Peer selection and the inter-node wire protocol: a node that is not the
//! owner of a key fetches the value from the owning node over HTTP instead
//! of hitting its own loader.

pub mod client;
pub mod pool;
pub mod routes;

pub use client::HttpGetter;
pub use pool::{HttpPool, DEFAULT_BASE_PATH};
pub use routes::create_peer_router;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// == Wire Types ==
/// Request half of the peer protocol: which group and key to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRequest {
    pub group: String,
    pub key: String,
}

/// Response half of the peer protocol: the raw value bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerResponse {
    pub value: Vec<u8>,
}

// == Peer Traits ==
/// Selects the node responsible for a key.
pub trait PeerPicker: Send + Sync {
    /// Returns a client for the owning node, or `None` when the local node
    /// is authoritative (or no peers are registered).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Client side of the peer protocol.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Fetches a value from the remote group named in the request.
    async fn get(&self, request: &PeerRequest) -> Result<PeerResponse>;
}
