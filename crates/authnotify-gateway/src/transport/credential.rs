//! Credential extraction for the upgrade and publish endpoints.
//!
//! Browsers cannot set headers on a WebSocket handshake, so the upgrade
//! endpoint takes the token from `?token=`; an `Authorization: Bearer`
//! header is accepted as a fallback for non-browser clients.

use axum::http::{header, HeaderMap};
use serde::Deserialize;

use authnotify_core::auth::{CredentialError, TokenValidator};

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// Token from `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

/// Query parameter first, header second.
pub fn extract_credential<'a>(query: &'a WsQuery, headers: &'a HeaderMap) -> Option<&'a str> {
    query
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(headers))
}

/// Admission gate: no credential at all is `MissingCredential`, anything
/// else is up to the validator.
pub fn admit(
    validator: &TokenValidator,
    credential: Option<&str>,
) -> Result<String, CredentialError> {
    match credential {
        Some(c) => validator.validate(c),
        None => Err(CredentialError::MissingCredential),
    }
}
