//! API Module
//!
//! User-facing HTTP endpoints, separate from the peer protocol.
//!
//! # Endpoints
//! - `GET /api?key=<k>` - Resolve a key through the cache pipeline
//! - `GET /stats` - Group statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_api_router;
