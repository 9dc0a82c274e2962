//! peercache - A distributed in-memory cache node
//!
//! Starts the peer protocol server for one node of the cluster, with a demo
//! group backed by an in-memory lookup table standing in for a slow backing
//! store.

mod api;
mod cache;
mod config;
mod error;
mod group;
mod models;
mod peers;
mod ring;
mod singleflight;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_api_router, ApiState};
use config::Config;
use error::{CacheError, Result};
use group::{GroupRegistry, Loader};
use peers::{create_peer_router, HttpPool};

/// Demo loader over a fixed table, standing in for a slow database.
struct SlowDbLoader {
    db: HashMap<String, String>,
}

impl SlowDbLoader {
    fn new() -> Self {
        let db = [("Tom", "630"), ("Jack", "589"), ("Sam", "567")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { db }
    }
}

#[async_trait]
impl Loader for SlowDbLoader {
    async fn load(&self, key: &str) -> Result<Vec<u8>> {
        info!(key, "slow db lookup");
        self.db
            .get(key)
            .map(|value| value.clone().into_bytes())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }
}

/// Main entry point for a peercache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the demo group with its loader
/// 4. Build the peer pool from the configured addresses
/// 5. Optionally start the user-facing API server
/// 6. Start the peer protocol server on the configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting peercache node");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: self_addr={}, peers={}, cache_bytes={}, api_enabled={}",
        config.self_addr,
        config.peer_addrs.join(","),
        config.cache_bytes,
        config.api_enabled
    );

    // Register the demo group
    let registry = Arc::new(GroupRegistry::new());
    let group = registry.new_group("scores", config.cache_bytes, Arc::new(SlowDbLoader::new()));

    // Wire the peer pool into the group
    let pool = Arc::new(HttpPool::new(&config.self_addr));
    pool.set_peers(&config.peer_addrs);
    group.register_peers(pool.clone());

    // Optionally expose the user-facing API server
    if config.api_enabled {
        let api_app = create_api_router(ApiState::new(group.clone()));
        let api_addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
        let api_listener = tokio::net::TcpListener::bind(api_addr)
            .await
            .with_context(|| format!("failed to bind API server on {}", api_addr))?;
        info!("API server listening on http://{}", api_addr);
        tokio::spawn(async move {
            if let Err(err) = axum::serve(api_listener, api_app).await {
                tracing::error!(%err, "API server exited");
            }
        });
    }

    // Start the peer protocol server
    let app = create_peer_router(registry, pool.base_path());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind peer server on {}", addr))?;
    info!("Peer server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("peer server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
