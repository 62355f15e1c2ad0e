//! Notification event (one fan-out message).
//!
//! Wire shape (exactly three fields, all required on decode):
//! `{"type":"NEW_USER","message":"A new user has registered","data":{"email":"user@example.com"}}`
//!
//! `data` is a `serde_json::Map`, which is ordered by key (the workspace does
//! not enable `preserve_order`), so encoding is deterministic for a given set
//! of fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NotifyError, Result};

/// Type tag emitted after a successful account registration.
pub const NEW_USER: &str = "NEW_USER";
/// Human-readable message that accompanies [`NEW_USER`].
pub const NEW_USER_MESSAGE: &str = "A new user has registered";

/// Immutable notification. Build it with [`Notification::new`] and the
/// consuming `with_*` helpers, then hand it to the broadcaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Notification {
    #[serde(rename = "type")]
    kind: String,
    message: String,
    data: Map<String, Value>,
}

impl Notification {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            data: Map::new(),
        }
    }

    /// Replace the whole data mapping.
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Insert one data entry. A repeated key overwrites the earlier value.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// The event the registration workflow emits for a freshly created account.
    pub fn new_user(email: &str) -> Self {
        Self::new(NEW_USER, NEW_USER_MESSAGE).with_field("email", email)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Reject events that would be meaningless on the wire.
    pub fn check(&self) -> Result<()> {
        if self.kind.trim().is_empty() {
            return Err(NotifyError::BadRequest("notification type must not be empty".into()));
        }
        Ok(())
    }

    /// Encode to the wire format.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| NotifyError::Internal(format!("notification encode failed: {e}")))
    }

    /// Decode from the wire format (used by clients and the publish endpoint).
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| NotifyError::BadRequest(format!("invalid notification json: {e}")))
    }
}
