//! API Handlers
//!
//! HTTP request handlers for the user-facing endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::Result;
use crate::group::Group;
use crate::models::{HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// The API server fronts exactly one group.
#[derive(Clone)]
pub struct ApiState {
    pub group: Arc<Group>,
}

impl ApiState {
    /// Creates a new ApiState for the given group.
    pub fn new(group: Arc<Group>) -> Self {
        Self { group }
    }
}

/// Query parameters for GET /api
#[derive(Debug, Deserialize)]
pub struct GetParams {
    #[serde(default)]
    pub key: String,
}

/// Handler for GET /api?key=<k>
///
/// Resolves the key through the full lookup pipeline and returns the raw
/// value bytes.
pub async fn get_value_handler(
    State(state): State<ApiState>,
    Query(params): Query<GetParams>,
) -> Result<impl IntoResponse> {
    let view = state.group.get(&params.key).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.to_vec(),
    ))
}

/// Handler for GET /stats
///
/// Returns the fronted group's counters.
pub async fn stats_handler(State(state): State<ApiState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.group.name(),
        state.group.stats(),
    ))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CacheError, Result};
    use crate::group::{GroupRegistry, Loader};
    use async_trait::async_trait;

    struct ScoresLoader;

    #[async_trait]
    impl Loader for ScoresLoader {
        async fn load(&self, key: &str) -> Result<Vec<u8>> {
            match key {
                "Tom" => Ok(b"630".to_vec()),
                _ => Err(CacheError::NotFound(key.to_string())),
            }
        }
    }

    fn test_state() -> ApiState {
        let registry = GroupRegistry::new();
        let group = registry.new_group("scores", 2 << 10, Arc::new(ScoresLoader));
        ApiState::new(group)
    }

    #[tokio::test]
    async fn test_get_value_handler() {
        let state = test_state();

        let params = GetParams {
            key: "Tom".to_string(),
        };
        let result = get_value_handler(State(state), Query(params)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_get_empty_key_is_rejected() {
        let state = test_state();

        let params = GetParams { key: String::new() };
        let result = get_value_handler(State(state), Query(params)).await;
        assert!(matches!(result, Err(CacheError::EmptyKey)));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        state.group.get("Tom").await.unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.group, "scores");
        assert_eq!(response.gets, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
