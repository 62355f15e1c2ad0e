//! Admission token validation tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

use authnotify_core::auth::{
    parse_algorithm, CredentialError, TokenIssuer, TokenValidator,
};

const SECRET: &[u8] = b"test-secret-key-with-enough-entropy";

fn validator() -> TokenValidator {
    TokenValidator::new(SECRET, Algorithm::HS256, 0).unwrap()
}

fn issuer() -> TokenIssuer {
    TokenIssuer::new(SECRET, Algorithm::HS256).unwrap()
}

fn raw_token(claims: serde_json::Value) -> String {
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

#[test]
fn valid_token_yields_subject() {
    let token = issuer().issue("42").unwrap();
    assert_eq!(validator().validate(&token).unwrap(), "42");
}

#[test]
fn validation_is_deterministic() {
    let token = issuer().issue("user-7").unwrap();
    let v = validator();
    assert_eq!(v.validate(&token), v.validate(&token));

    let bad = "definitely.not.a-jwt";
    assert_eq!(v.validate(bad), v.validate(bad));
    assert!(v.validate(bad).is_err());
}

#[test]
fn empty_credential_is_missing() {
    assert_eq!(validator().validate(""), Err(CredentialError::MissingCredential));
}

#[test]
fn whitespace_credential_is_present_but_invalid() {
    let err = validator().validate("   ").unwrap_err();
    assert!(matches!(err, CredentialError::InvalidCredential(_)), "got {err:?}");
    assert_eq!(err.close_reason(), "Invalid authentication token");
}

#[test]
fn tampered_signature_is_invalid() {
    let token = issuer().issue("42").unwrap();
    let (head, sig) = token.rsplit_once('.').unwrap();
    let flipped = if sig.starts_with('A') { "B" } else { "A" };
    let tampered = format!("{head}.{flipped}{}", &sig[1..]);

    let err = validator().validate(&tampered).unwrap_err();
    assert!(matches!(err, CredentialError::InvalidCredential(_)), "got {err:?}");
}

#[test]
fn tampered_claims_are_invalid() {
    let token = issuer().issue("42").unwrap();
    let forged = issuer().issue("admin").unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    let forged_parts: Vec<&str> = forged.split('.').collect();
    let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

    let err = validator().validate(&spliced).unwrap_err();
    assert!(matches!(err, CredentialError::InvalidCredential(_)), "got {err:?}");
}

#[test]
fn wrong_secret_is_invalid() {
    let other = TokenIssuer::new(b"some-other-secret", Algorithm::HS256).unwrap();
    let token = other.issue("42").unwrap();
    assert!(matches!(
        validator().validate(&token),
        Err(CredentialError::InvalidCredential(_))
    ));
}

#[test]
fn wrong_algorithm_is_invalid() {
    let hs512 = TokenIssuer::new(SECRET, Algorithm::HS512).unwrap();
    let token = hs512.issue("42").unwrap();
    assert!(matches!(
        validator().validate(&token),
        Err(CredentialError::InvalidCredential(_))
    ));
}

#[test]
fn malformed_token_is_invalid() {
    for bad in ["abc", "a.b", "a.b.c", "Bearer xyz"] {
        assert!(
            matches!(validator().validate(bad), Err(CredentialError::InvalidCredential(_))),
            "input={bad}"
        );
    }
}

#[test]
fn expired_token_is_expired() {
    let token = issuer()
        .issue_at("42", Utc::now() - Duration::hours(2))
        .unwrap();
    assert_eq!(validator().validate(&token), Err(CredentialError::ExpiredCredential));
}

#[test]
fn leeway_admits_recently_expired_token() {
    let token = issuer()
        .with_ttl(Duration::seconds(1))
        .issue_at("42", Utc::now() - Duration::seconds(10))
        .unwrap();

    assert_eq!(validator().validate(&token), Err(CredentialError::ExpiredCredential));

    let lenient = TokenValidator::new(SECRET, Algorithm::HS256, 60).unwrap();
    assert_eq!(lenient.validate(&token).unwrap(), "42");
}

#[test]
fn missing_subject_is_invalid_payload() {
    let exp = (Utc::now() + Duration::minutes(5)).timestamp();

    let no_sub = raw_token(json!({ "exp": exp }));
    assert_eq!(validator().validate(&no_sub), Err(CredentialError::InvalidTokenPayload));

    let empty_sub = raw_token(json!({ "sub": "", "exp": exp }));
    assert_eq!(validator().validate(&empty_sub), Err(CredentialError::InvalidTokenPayload));
}

#[test]
fn non_string_subject_is_invalid() {
    let exp = (Utc::now() + Duration::minutes(5)).timestamp();
    for sub in [json!(17), json!(0), json!(null), json!(true), json!({ "id": 1 })] {
        let token = raw_token(json!({ "sub": sub, "exp": exp }));
        let err = validator().validate(&token).unwrap_err();
        assert!(matches!(err, CredentialError::InvalidCredential(_)), "sub={sub} got {err:?}");
        assert_eq!(err.close_reason(), "Invalid authentication token");
    }
}

#[test]
fn token_without_expiry_is_invalid() {
    let token = raw_token(json!({ "sub": "42" }));
    assert!(matches!(
        validator().validate(&token),
        Err(CredentialError::InvalidCredential(_))
    ));
}

#[test]
fn close_reasons_match_wire_strings() {
    assert_eq!(
        CredentialError::MissingCredential.close_reason(),
        "Missing authentication token"
    );
    assert_eq!(CredentialError::InvalidTokenPayload.close_reason(), "Invalid token payload");
    assert_eq!(
        CredentialError::InvalidCredential("x".into()).close_reason(),
        "Invalid authentication token"
    );
    assert_eq!(
        CredentialError::ExpiredCredential.close_reason(),
        "Invalid authentication token"
    );
}

#[test]
fn only_shared_secret_algorithms_parse() {
    assert_eq!(parse_algorithm("HS256").unwrap(), Algorithm::HS256);
    assert_eq!(parse_algorithm("HS512").unwrap(), Algorithm::HS512);
    assert!(parse_algorithm("RS256").is_err());
    assert!(parse_algorithm("none").is_err());
    assert!(TokenValidator::new(b"", Algorithm::HS256, 0).is_err());
    assert!(TokenValidator::new(SECRET, Algorithm::RS256, 0).is_err());
}
