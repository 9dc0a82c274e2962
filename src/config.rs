//! Configuration Module
//!
//! Handles loading and managing node configuration from environment
//! variables.

use std::env;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. The peer address list is static for the life of the process;
/// membership discovery is out of scope.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget for each group's local cache
    pub cache_bytes: usize,
    /// Port the peer protocol server listens on
    pub server_port: u16,
    /// This node's advertised address, as it appears in the peer list
    pub self_addr: String,
    /// Addresses of all nodes in the cluster (including this one)
    pub peer_addrs: Vec<String>,
    /// Whether to also expose the user-facing API server
    pub api_enabled: bool,
    /// Port for the user-facing API server
    pub api_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BYTES` - Per-group cache byte budget (default: 1048576)
    /// - `SERVER_PORT` - Peer protocol port (default: 8001)
    /// - `SELF_ADDR` - Advertised address (default: http://localhost:<port>)
    /// - `PEER_ADDRS` - Comma-separated peer addresses (default: the
    ///   three-node localhost demo set)
    /// - `API_ENABLED` - Start the user-facing API server (default: false)
    /// - `API_PORT` - API server port (default: 9999)
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8001);
        let self_addr = env::var("SELF_ADDR")
            .unwrap_or_else(|_| format!("http://localhost:{}", server_port));
        let peer_addrs = env::var("PEER_ADDRS")
            .map(|v| {
                v.split(',')
                    .map(|addr| addr.trim().to_string())
                    .filter(|addr| !addr.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| Self::default_peers());

        Self {
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1 << 20),
            server_port,
            self_addr,
            peer_addrs,
            api_enabled: env::var("API_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(9999),
        }
    }

    fn default_peers() -> Vec<String> {
        vec![
            "http://localhost:8001".to_string(),
            "http://localhost:8002".to_string(),
            "http://localhost:8003".to_string(),
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_bytes: 1 << 20,
            server_port: 8001,
            self_addr: "http://localhost:8001".to_string(),
            peer_addrs: Self::default_peers(),
            api_enabled: false,
            api_port: 9999,
        }
    }
}
