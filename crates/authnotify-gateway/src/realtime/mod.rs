//! Realtime runtime (egress engine) for the notification gateway.

pub mod core;
pub mod types;

pub use core::{BroadcastEngine, ConnState, Connection, ConnectionId, ConnectionRegistry};
pub use types::{DeliveryFailure, PreparedMsg, PublishReport};
