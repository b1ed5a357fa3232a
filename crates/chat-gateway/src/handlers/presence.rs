//! Presence updates driven by connection lifecycle

use chat_core::Snowflake;
use chat_service::ProfileService;

use super::HandlerResult;
use crate::server::GatewayState;

/// Flips a profile's online flag as its connections come and go
pub struct PresenceHandler;

impl PresenceHandler {
    /// Mark a profile online; fails when the profile does not exist
    pub async fn mark_online(state: &GatewayState, identity: Snowflake) -> HandlerResult<()> {
        ProfileService::new(state.service_context())
            .set_presence(identity, true)
            .await?;
        Ok(())
    }

    /// Mark a profile offline after its last connection went away
    ///
    /// Best effort: the connection is already gone, so a failure is only
    /// logged.
    pub async fn mark_offline(state: &GatewayState, identity: Snowflake) {
        match ProfileService::new(state.service_context())
            .set_presence(identity, false)
            .await
        {
            Ok(_) => tracing::debug!(identity = %identity, "Profile presence set to offline"),
            Err(e) => tracing::warn!(
                identity = %identity,
                error = %e,
                "Failed to mark profile offline"
            ),
        }
    }
}
