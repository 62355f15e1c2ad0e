//! authnotify core: transport-agnostic pieces shared by the gateway and its
//! collaborators.
//!
//! This crate defines the notification wire format, bearer credential
//! validation/issuance, and the error surface. It carries no transport or
//! runtime dependencies so the registration workflow (or any other event
//! producer) can depend on it without pulling in the server stack.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible
//! path surfaces as `NotifyError`/`CredentialError` so hostile tokens or
//! malformed events never crash the gateway.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod auth;
pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{Result, NotifyError};
pub use protocol::event::Notification;
