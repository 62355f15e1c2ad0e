use serde::Deserialize;

use authnotify_core::auth;
use authnotify_core::error::{NotifyError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    pub auth: AuthSection,

    #[serde(default)]
    pub broadcast: BroadcastSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(NotifyError::UnsupportedVersion);
        }
        self.gateway.validate()?;
        self.auth.validate()?;
        self.broadcast.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Per-connection outbound queue depth.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            outbound_queue: default_outbound_queue(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(NotifyError::BadRequest(
                "gateway.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(NotifyError::BadRequest(
                "gateway.idle_timeout_ms must be between 10000 and 600000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(NotifyError::BadRequest(
                "gateway.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(1..=65536).contains(&self.outbound_queue) {
            return Err(NotifyError::BadRequest(
                "gateway.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_outbound_queue() -> usize {
    64
}

/// Shared-secret settings; the secret comes either inline or from an
/// environment variable, never both.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    #[serde(default)]
    pub secret: Option<String>,

    #[serde(default)]
    pub secret_env: Option<String>,

    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    #[serde(default)]
    pub leeway_secs: u64,
}

impl AuthSection {
    pub fn validate(&self) -> Result<()> {
        match (&self.secret, &self.secret_env) {
            (Some(_), Some(_)) => {
                return Err(NotifyError::BadRequest(
                    "auth.secret and auth.secret_env are mutually exclusive".into(),
                ))
            }
            (None, None) => {
                return Err(NotifyError::BadRequest(
                    "one of auth.secret or auth.secret_env is required".into(),
                ))
            }
            (Some(s), None) if s.is_empty() => {
                return Err(NotifyError::BadRequest("auth.secret must not be empty".into()))
            }
            (None, Some(var)) if var.trim().is_empty() => {
                return Err(NotifyError::BadRequest("auth.secret_env must name a variable".into()))
            }
            _ => {}
        }
        auth::parse_algorithm(&self.algorithm)?;
        if self.leeway_secs > 300 {
            return Err(NotifyError::BadRequest(
                "auth.leeway_secs must be at most 300".into(),
            ));
        }
        Ok(())
    }

    /// Secret bytes, reading the environment when configured that way.
    pub fn resolve_secret(&self) -> Result<String> {
        if let Some(s) = &self.secret {
            return Ok(s.clone());
        }
        let var = self.secret_env.as_deref().unwrap_or_default();
        match std::env::var(var) {
            Ok(s) if !s.is_empty() => Ok(s),
            _ => Err(NotifyError::BadRequest(format!(
                "auth.secret_env: environment variable {var} is unset or empty"
            ))),
        }
    }
}

fn default_algorithm() -> String {
    "HS256".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BroadcastSection {
    /// Upper bound for one connection's send during a publish.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl Default for BroadcastSection {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl BroadcastSection {
    pub fn validate(&self) -> Result<()> {
        if !(10..=60000).contains(&self.send_timeout_ms) {
            return Err(NotifyError::BadRequest(
                "broadcast.send_timeout_ms must be between 10 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_send_timeout_ms() -> u64 {
    2000
}
