//! Individual WebSocket connection

use std::sync::Arc;
use std::time::{Duration, Instant};

use chat_core::Snowflake;
use tokio::sync::{mpsc, RwLock};

use crate::protocol::ServerEvent;

/// A single WebSocket connection
///
/// Anonymous until the client registers. Outbound payloads go through a
/// bounded queue drained by the socket's send task.
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// Registered profile (None until register)
    identity: RwLock<Option<Snowflake>>,

    /// Channel to send messages to the WebSocket
    sender: mpsc::Sender<ServerEvent>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub fn new(session_id: String, sender: mpsc::Sender<ServerEvent>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            identity: RwLock::new(None),
            sender,
            created_at: Instant::now(),
        })
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the registered identity
    pub async fn identity(&self) -> Option<Snowflake> {
        *self.identity.read().await
    }

    /// Bind an identity, returning the one it replaces
    pub async fn set_identity(&self, identity: Snowflake) -> Option<Snowflake> {
        self.identity.write().await.replace(identity)
    }

    pub async fn is_registered(&self) -> bool {
        self.identity.read().await.is_some()
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Send a message to this connection
    pub async fn send(&self, message: ServerEvent) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.sender.send(message).await
    }

    /// Try to send a message (non-blocking)
    pub fn try_send(&self, message: ServerEvent) -> Result<(), mpsc::error::TrySendError<ServerEvent>> {
        self.sender.try_send(message)
    }

    /// Check if the sender channel is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}
