#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use authnotify_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:8000"
auth:
  secret: "s3cret"
broadcast:
  send_timeout: 100 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
auth:
  secret: "s3cret"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.auth.algorithm, "HS256");
    assert_eq!(cfg.auth.leeway_secs, 0);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:8000");
    assert_eq!(cfg.gateway.outbound_queue, 64);
    assert_eq!(cfg.broadcast.send_timeout_ms, 2000);
    assert_eq!(cfg.auth.resolve_secret().unwrap(), "s3cret");
}

#[test]
fn auth_section_is_required() {
    let err = config::load_from_str("version: 1\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn unsupported_version() {
    let bad = r#"
version: 2
auth:
  secret: "s3cret"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn secret_sources_are_exclusive() {
    let both = r#"
version: 1
auth:
  secret: "s3cret"
  secret_env: "SECRET_KEY"
"#;
    assert!(config::load_from_str(both).is_err());

    let neither = r#"
version: 1
auth:
  algorithm: "HS256"
"#;
    assert!(config::load_from_str(neither).is_err());
}

#[test]
fn asymmetric_algorithm_rejected() {
    let bad = r#"
version: 1
auth:
  secret: "s3cret"
  algorithm: "RS256"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ranges_are_enforced() {
    let idle_below_ping = r#"
version: 1
gateway:
  ping_interval_ms: 30000
  idle_timeout_ms: 20000
auth:
  secret: "s3cret"
"#;
    assert!(config::load_from_str(idle_below_ping).is_err());

    let zero_queue = r#"
version: 1
gateway:
  outbound_queue: 0
auth:
  secret: "s3cret"
"#;
    assert!(config::load_from_str(zero_queue).is_err());

    let tiny_timeout = r#"
version: 1
auth:
  secret: "s3cret"
broadcast:
  send_timeout_ms: 1
"#;
    assert!(config::load_from_str(tiny_timeout).is_err());
}

#[test]
fn secret_from_environment() {
    let yaml = r#"
version: 1
auth:
  secret_env: "AUTHNOTIFY_TEST_SECRET_FROM_ENV"
"#;
    let cfg = config::load_from_str(yaml).expect("must parse");
    assert!(cfg.auth.resolve_secret().is_err());

    std::env::set_var("AUTHNOTIFY_TEST_SECRET_FROM_ENV", "from-env");
    assert_eq!(cfg.auth.resolve_secret().unwrap(), "from-env");
}
