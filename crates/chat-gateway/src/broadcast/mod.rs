//! Event broadcasting
//!
//! Turns domain events into keyed payloads for the connections of their
//! recipients.

mod dispatcher;

pub use dispatcher::{Delivery, FanoutDispatcher};
