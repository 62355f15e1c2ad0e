//! Shared application state for the notification gateway.
//!
//! Owns the connection registry for the lifetime of the server: it is built
//! here at startup and torn down by `begin_drain` at shutdown. Everything is
//! behind `Arc`, so cloning the state per request is cheap.

use std::sync::Arc;

use tokio::time::Duration;

use authnotify_core::auth::{self, TokenValidator};
use authnotify_core::error::Result;

use crate::config::GatewayConfig;
use crate::obs::metrics::GatewayMetrics;
use crate::realtime::{BroadcastEngine, ConnectionRegistry};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    registry: Arc<ConnectionRegistry>,
    broadcaster: Arc<BroadcastEngine>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    validator: TokenValidator,
}

impl AppState {
    /// Build application state. Errors (bad secret source, unsupported
    /// algorithm) are returned so `main` can report them instead of panicking.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let secret = cfg.auth.resolve_secret()?;
        let algorithm = auth::parse_algorithm(&cfg.auth.algorithm)?;
        let validator = TokenValidator::new(secret.as_bytes(), algorithm, cfg.auth.leeway_secs)?;

        let metrics = Arc::new(GatewayMetrics::default());
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Arc::new(BroadcastEngine::new(
            Arc::clone(&registry),
            Duration::from_millis(cfg.broadcast.send_timeout_ms),
            Arc::clone(&metrics),
        ));

        tracing::info!(
            algorithm = %cfg.auth.algorithm,
            send_timeout_ms = cfg.broadcast.send_timeout_ms,
            "gateway state initialized"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, validator }),
            registry,
            broadcaster,
            metrics,
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.inner.validator
    }

    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Publish handle for in-process collaborators.
    pub fn broadcaster(&self) -> Arc<BroadcastEngine> {
        Arc::clone(&self.broadcaster)
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Stop admitting clients and close every live session.
    pub fn begin_drain(&self) -> usize {
        self.metrics.set_draining();
        let closed = self.registry.close_all();
        tracing::info!(closed, "gateway draining");
        closed
    }

    /// Registry gauges appended to the metrics scrape.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("authnotify_registry_connections", self.registry.len() as u64),
            ("authnotify_registry_admitted_total", self.registry.admitted_total()),
        ]
    }
}
