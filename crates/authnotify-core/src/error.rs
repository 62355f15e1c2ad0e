//! Shared error type across authnotify crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed input or configuration.
    BadRequest,
    /// Credential rejected.
    AuthFailed,
    /// Unsupported config/protocol version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AuthFailed => "AUTH_FAILED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("auth failed: {0}")]
    AuthFailed(#[from] crate::auth::CredentialError),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl NotifyError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            NotifyError::BadRequest(_) => ClientCode::BadRequest,
            NotifyError::AuthFailed(_) => ClientCode::AuthFailed,
            NotifyError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            NotifyError::Internal(_) => ClientCode::Internal,
        }
    }
}
