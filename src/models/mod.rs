//! Models Module
//!
//! Response DTOs for the user-facing API server.

pub mod responses;

pub use responses::*;
