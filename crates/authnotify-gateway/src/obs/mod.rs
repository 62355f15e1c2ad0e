//! Lightweight in-process metrics.
//!
//! Stored as atomics and rendered by the `/metrics` handler in Prometheus
//! text format; no exporter crate is involved.

pub mod metrics;
