//! Register handler

use std::sync::Arc;

use chat_core::Snowflake;

use super::{HandlerError, HandlerResult, PresenceHandler};
use crate::connection::{Connection, RegisterOutcome};
use crate::server::GatewayState;

/// Handles `register` messages
pub struct RegisterHandler;

impl RegisterHandler {
    /// Bind the connection to a profile and mark that profile online
    ///
    /// An unknown profile leaves the connection as it was.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        identity: Snowflake,
    ) -> HandlerResult<()> {
        PresenceHandler::mark_online(state, identity).await?;

        let session_id = connection.session_id();
        match state.registry().register(session_id, identity).await {
            RegisterOutcome::UnknownSession => {
                if !state.registry().is_online(identity) {
                    PresenceHandler::mark_offline(state, identity).await;
                }
                Err(HandlerError::UnknownSession(session_id.to_string()))
            }
            RegisterOutcome::Closed { released } => {
                for orphan in released {
                    PresenceHandler::mark_offline(state, orphan).await;
                }
                Err(HandlerError::UnknownSession(session_id.to_string()))
            }
            RegisterOutcome::Registered { released } => {
                if let Some(previous) = released {
                    PresenceHandler::mark_offline(state, previous).await;
                }

                tracing::info!(
                    session_id = %session_id,
                    identity = %identity,
                    "Client registered"
                );

                Ok(())
            }
        }
    }
}
