//! Axum router wiring.
//!
//! `/v1/ws` is the notification upgrade endpoint (also mounted at
//! `/api/notifications/ws` for the existing frontend); `/v1/publish` lets
//! out-of-process producers hand events to the broadcaster; the rest are
//! operational endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

/// Upgrade path the existing web frontend connects to.
pub const LEGACY_WS_PATH: &str = "/api/notifications/ws";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/ws", get(transport::ws::ws_upgrade))
        .route(LEGACY_WS_PATH, get(transport::ws::ws_upgrade))
        .route("/v1/publish", post(ops::publish::publish))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
