//! Socket endpoint
//!
//! The gateway does not run its own listener; the HTTP server mounts
//! [`socket_handler`] next to its REST routes.

mod handler;
mod state;

pub use handler::socket_handler;
pub use state::GatewayState;
