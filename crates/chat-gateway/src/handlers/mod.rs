//! Client message handlers

mod error;
mod presence;
mod register;

pub use error::{HandlerError, HandlerResult};
pub use presence::PresenceHandler;
pub use register::RegisterHandler;

use std::sync::Arc;

use crate::connection::Connection;
use crate::protocol::{ClientMessage, ServerEvent};
use crate::server::GatewayState;

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming client message
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: ClientMessage,
    ) -> HandlerResult<()> {
        match message {
            ClientMessage::Register { id } => RegisterHandler::handle(state, connection, id).await,
            ClientMessage::Ping => connection
                .send(ServerEvent::pong())
                .await
                .map_err(|_| HandlerError::Closed),
        }
    }
}
