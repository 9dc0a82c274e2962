//! Peer Routes Module
//!
//! Inbound half of the peer protocol: serves `GET <base><group>/<key>` to
//! other nodes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::group::GroupRegistry;
use crate::peers::PeerResponse;

/// State shared by the peer protocol handlers.
#[derive(Clone)]
pub struct PeerServerState {
    pub registry: Arc<GroupRegistry>,
}

// == Router ==
/// Creates the peer protocol router mounted under `base_path`.
///
/// The single wildcard route captures everything below the base path; shape
/// validation happens in the handler so malformed paths get a 400 rather
/// than a routing 404.
pub fn create_peer_router(registry: Arc<GroupRegistry>, base_path: &str) -> Router {
    let route = format!("{}*rest", base_path);
    Router::new()
        .route(&route, get(peer_get_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(PeerServerState { registry })
}

// == Handler ==
/// Handler for GET `<base>/<group>/<key>`.
///
/// Splits the remainder on the first `/` into group name and key; the key
/// may itself contain slashes. Responds 400 for any other shape, 404 for an
/// unknown group, 500 with the error message for a failed lookup, and 200
/// with a bincode-encoded payload on success.
async fn peer_get_handler(
    State(state): State<PeerServerState>,
    Path(rest): Path<String>,
) -> Response {
    let Some((group_name, key)) = rest.split_once('/') else {
        return (StatusCode::BAD_REQUEST, "bad request").into_response();
    };
    debug!(group = group_name, key, "peer request");

    let Some(group) = state.registry.get_group(group_name) else {
        return (
            StatusCode::NOT_FOUND,
            format!("no such group: {}", group_name),
        )
            .into_response();
    };

    match group.get(key).await {
        Ok(view) => {
            let payload = PeerResponse {
                value: view.to_vec(),
            };
            match bincode::serialize(&payload) {
                Ok(body) => (
                    [(header::CONTENT_TYPE, "application/octet-stream")],
                    body,
                )
                    .into_response(),
                Err(err) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
                }
            }
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}
