//! Wire formats.
//!
//! The gateway speaks a single outbound message shape: a JSON notification
//! object sent as one WebSocket text frame per event. Clients never send
//! application messages back, so there is no inbound envelope.

pub mod event;
