//! # chat-gateway
//!
//! Real-time delivery over WebSocket.
//!
//! Clients connect anonymously and bind an identity with a `register`
//! message. The [`connection::ConnectionRegistry`] tracks which connections
//! belong to which profile, and the [`broadcast::FanoutDispatcher`] turns
//! domain events into keyed payloads sent only to the profiles an event
//! names.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use broadcast::{Delivery, FanoutDispatcher};
pub use connection::{Connection, ConnectionRegistry, RegisterOutcome};
pub use handlers::{HandlerError, HandlerResult};
pub use protocol::{ClientMessage, ServerEvent};
pub use server::{socket_handler, GatewayState};
