//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use authnotify_core::error::{NotifyError, Result};

pub use schema::{AuthSection, BroadcastSection, GatewayConfig, GatewaySection};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "AUTHNOTIFY_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "authnotify.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| NotifyError::Internal(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| NotifyError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
