//! Transport layer (WebSocket).
//!
//! Exposes the upgrade handler that admits clients and runs their passive
//! session loop, plus credential extraction shared with the publish endpoint.

pub mod credential;
pub mod ws;
