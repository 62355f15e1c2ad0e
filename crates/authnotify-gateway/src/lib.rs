//! authnotify gateway library entry.
//!
//! Wires admission, the connection registry, the broadcast engine and the
//! operational endpoints into one axum application. Consumed by the binary
//! (`main.rs`), by in-process event producers through
//! [`AppState::broadcaster`](app_state::AppState::broadcaster), and by the
//! integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod transport;
