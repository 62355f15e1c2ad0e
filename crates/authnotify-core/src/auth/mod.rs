//! Bearer credential handling.
//!
//! The surrounding application signs short-lived JWTs with a shared secret;
//! the gateway only needs to check them. Both halves live here so producers
//! and the gateway agree on claims and algorithm without a network hop.
//!
//! Admission stops at signature + expiry: the subject is not
//! looked up in any user store, so an account revoked after issuance is
//! still admitted until its token expires.

pub mod issuer;
pub mod validator;

use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::error::{NotifyError, Result};

pub use issuer::TokenIssuer;
pub use validator::{CredentialError, TokenValidator};

/// Algorithm used when configuration does not name one.
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Parse a shared-secret signing algorithm name (`HS256`, `HS384`, `HS512`).
///
/// Asymmetric algorithms are refused: the gateway is configured with a
/// single shared secret, never a key pair.
pub fn parse_algorithm(name: &str) -> Result<Algorithm> {
    let alg = Algorithm::from_str(name.trim())
        .map_err(|_| NotifyError::BadRequest(format!("unknown signing algorithm: {name}")))?;
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
        other => Err(NotifyError::BadRequest(format!(
            "signing algorithm {other:?} needs a key pair; only HS256/HS384/HS512 are supported"
        ))),
    }
}
