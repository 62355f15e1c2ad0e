use axum::extract::ws::Message;
use serde::Serialize;

use authnotify_core::error::Result;
use authnotify_core::Notification;

/// Event encoded once per publish and copied into each connection's queue.
#[derive(Debug, Clone)]
pub struct PreparedMsg(String);

impl PreparedMsg {
    pub fn prepare(event: &Notification) -> Result<Self> {
        event.to_json().map(PreparedMsg)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// axum's text frame owns its `String`, so every recipient gets a copy.
    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.0.clone())
    }
}

/// Why a single delivery did not happen. Always local to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// Session task is gone or the connection was already closed.
    Closed,
    /// Outbound queue stayed full past the send timeout.
    Timeout,
}

impl DeliveryFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryFailure::Closed => "closed",
            DeliveryFailure::Timeout => "timeout",
        }
    }
}

/// Outcome of one publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Connections in the snapshot.
    pub recipients: usize,
    pub delivered: usize,
    /// Connections removed because their delivery failed.
    pub pruned: usize,
}
