//! Admission-time token validation.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::{NotifyError, Result};

/// Close reason sent when the upgrade request carries no credential.
pub const REASON_MISSING: &str = "Missing authentication token";
/// Close reason sent when the token verifies but names no subject.
pub const REASON_BAD_PAYLOAD: &str = "Invalid token payload";
/// Close reason sent for bad signatures, malformed tokens and expired tokens.
pub const REASON_INVALID: &str = "Invalid authentication token";

/// Why a credential was refused at the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("missing credential")]
    MissingCredential,
    /// Signature, encoding, required-claim or subject-type failure.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    /// Verified token with no `sub` or an empty one.
    #[error("credential carries no subject")]
    InvalidTokenPayload,
    #[error("credential expired")]
    ExpiredCredential,
}

impl CredentialError {
    /// Reason string carried in the policy-violation close frame.
    pub fn close_reason(&self) -> &'static str {
        match self {
            CredentialError::MissingCredential => REASON_MISSING,
            CredentialError::InvalidTokenPayload => REASON_BAD_PAYLOAD,
            CredentialError::InvalidCredential(_) | CredentialError::ExpiredCredential => {
                REASON_INVALID
            }
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            CredentialError::MissingCredential => "missing",
            CredentialError::InvalidCredential(_) => "invalid",
            CredentialError::InvalidTokenPayload => "invalid_payload",
            CredentialError::ExpiredCredential => "expired",
        }
    }
}

/// Only the claims admission cares about; `exp` is checked by `jsonwebtoken`.
/// `sub` stays untyped so a non-string subject is told apart from a missing one.
#[derive(Debug, Deserialize)]
struct AdmissionClaims {
    #[serde(default, deserialize_with = "present")]
    sub: Option<Value>,
}

/// Keeps an explicit `"sub": null` as `Some(Value::Null)`.
fn present<'de, D>(de: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(de).map(Some)
}

/// Validates bearer credentials against the shared secret.
///
/// Holds only immutable key material, so one instance is shared by every
/// handshake without locking.
#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(secret: &[u8], algorithm: Algorithm, leeway_secs: u64) -> Result<Self> {
        if secret.is_empty() {
            return Err(NotifyError::BadRequest("signing secret must not be empty".into()));
        }
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(NotifyError::BadRequest(format!(
                "unsupported signing algorithm: {algorithm:?}"
            )));
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = leeway_secs;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Check `credential` and return the subject it was issued to.
    pub fn validate(&self, credential: &str) -> std::result::Result<String, CredentialError> {
        if credential.is_empty() {
            return Err(CredentialError::MissingCredential);
        }

        let data = decode::<AdmissionClaims>(credential, &self.key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => CredentialError::ExpiredCredential,
                _ => CredentialError::InvalidCredential(e.to_string()),
            },
        )?;

        match data.claims.sub {
            Some(Value::String(s)) if !s.is_empty() => Ok(s),
            Some(Value::String(_)) | None => Err(CredentialError::InvalidTokenPayload),
            Some(_) => Err(CredentialError::InvalidCredential(
                "subject claim must be a string".into(),
            )),
        }
    }
}
