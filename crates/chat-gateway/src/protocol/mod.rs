//! Socket protocol
//!
//! Clients send `{"method": ..., "data": ...}`; the server pushes
//! `{"key": ..., "event": ..., "data": ...}` where `key` is the routing key a
//! client listens on.

mod messages;

pub use messages::{ClientMessage, ServerEvent};
