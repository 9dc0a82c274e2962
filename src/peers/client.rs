//! Peer Client Module
//!
//! Outbound half of the peer protocol: fetches a value from the owning
//! node over HTTP.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{CacheError, Result};
use crate::peers::{PeerGetter, PeerRequest, PeerResponse};

// == HTTP Getter ==
/// HTTP client bound to one remote peer.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    client: reqwest::Client,
    /// Peer address plus the protocol base path, e.g.
    /// `http://localhost:8002/_peercache/`
    base_url: String,
}

impl HttpGetter {
    /// Creates a getter for the peer behind `base_url`.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, request: &PeerRequest) -> Result<PeerResponse> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(&request.group),
            urlencoding::encode(&request.key),
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| CacheError::PeerUnavailable(err.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(CacheError::Protocol(format!(
                "peer returned {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| CacheError::PeerUnavailable(format!("reading response body: {}", err)))?;

        bincode::deserialize(&body)
            .map_err(|err| CacheError::Protocol(format!("decoding response body: {}", err)))
    }
}
