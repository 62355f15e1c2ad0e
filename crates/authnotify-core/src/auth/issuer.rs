//! Token issuance for the collaborator side of the bearer scheme.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::error::{NotifyError, Result};

/// Lifetime of an access token when the caller does not override it.
pub const DEFAULT_TTL_MINUTES: i64 = 30;

#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    sub: &'a str,
    iat: i64,
    exp: i64,
}

/// Signs access tokens the gateway will admit.
pub struct TokenIssuer {
    key: EncodingKey,
    header: Header,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Result<Self> {
        if secret.is_empty() {
            return Err(NotifyError::BadRequest("signing secret must not be empty".into()));
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret),
            header: Header::new(algorithm),
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Issue a token for `subject`, valid from now for the configured TTL.
    pub fn issue(&self, subject: &str) -> Result<String> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if it had been signed at `issued_at`.
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = IssuedClaims {
            sub: subject,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&self.header, &claims, &self.key)
            .map_err(|e| NotifyError::Internal(format!("token encode failed: {e}")))
    }
}
