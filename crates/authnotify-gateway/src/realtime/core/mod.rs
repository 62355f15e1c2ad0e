//! Realtime core components for the gateway runtime.
//!
//! Connection lifecycle, the live-connection registry, and the broadcast
//! engine that fans events out over registry snapshots.

mod broadcast;
mod connection;
mod registry;

pub use broadcast::BroadcastEngine;
pub use connection::{ConnState, Connection, ConnectionId};
pub use registry::ConnectionRegistry;
