//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache lookups and the peer protocol.
///
/// The enum is `Clone` because coalesced callers of the same in-flight load
/// all receive the same error value.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Caller passed an empty key
    #[error("key must not be empty")]
    EmptyKey,

    /// Backing source has no value for the key
    #[error("key not found: {0}")]
    NotFound(String),

    /// Peer protocol request named an unregistered group
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// Peer could not be reached or the transfer broke off
    #[error("peer unavailable: {0}")]
    PeerUnavailable(String),

    /// Peer answered with a malformed response or a non-OK status
    #[error("peer protocol error: {0}")]
    Protocol(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::EmptyKey => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::PeerUnavailable(_) => StatusCode::BAD_GATEWAY,
            CacheError::Protocol(_) => StatusCode::BAD_GATEWAY,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
