//! Top-level facade crate for authnotify.
//!
//! Re-exports the core types (wire event, token handling) and the gateway
//! library so users can depend on a single crate.

pub mod core {
    pub use authnotify_core::*;
}

pub mod gateway {
    pub use authnotify_gateway::*;
}
