//! Connection management
//!
//! Tracks live WebSocket connections and the identities bound to them.

mod connection;
mod registry;

pub use connection::Connection;
pub use registry::{ConnectionRegistry, RegisterOutcome};

/// Generate a new session ID
#[must_use]
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
