//! peercache - A distributed in-memory cache
//!
//! Each process holds a byte-budgeted LRU cache of loader-computed values
//! and cooperates with a static set of peers over HTTP; key ownership is
//! decided by a consistent hash ring, and concurrent lookups for the same
//! missing key collapse into one load.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod ring;
pub mod singleflight;

pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Group, GroupRegistry, Loader};
pub use peers::HttpPool;
