//! Connection registry
//!
//! Holds every live connection and an identity index over them, both in
//! `DashMap`s so registration, disconnects and broadcasts can interleave
//! freely.

use std::collections::HashSet;
use std::sync::Arc;

use chat_core::Snowflake;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::Connection;
use crate::protocol::ServerEvent;

/// Result of binding an identity to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// No live connection has this session ID
    UnknownSession,
    /// The connection closed while it was being registered. `released`
    /// lists identities it held that have no live connection left.
    Closed { released: Vec<Snowflake> },
    /// The connection now carries the identity. `released` is a previously
    /// bound identity that has no live connection left.
    Registered { released: Option<Snowflake> },
}

/// Manages all active WebSocket connections
pub struct ConnectionRegistry {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// Identity to session IDs mapping
    identities: DashMap<Snowflake, HashSet<String>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            identities: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Track a new, still anonymous connection
    pub fn add_connection(&self, session_id: String, sender: mpsc::Sender<ServerEvent>) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), sender);
        self.connections.insert(session_id.clone(), connection.clone());

        tracing::debug!(session_id = %session_id, "Connection added");

        connection
    }

    /// Bind an identity to a connection, replacing any earlier one
    pub async fn register(&self, session_id: &str, identity: Snowflake) -> RegisterOutcome {
        let Some(connection) = self.get_connection(session_id) else {
            return RegisterOutcome::UnknownSession;
        };

        self.bind(&connection, identity).await
    }

    async fn bind(&self, connection: &Arc<Connection>, identity: Snowflake) -> RegisterOutcome {
        let session_id = connection.session_id();
        let previous = connection.set_identity(identity).await;
        self.identities
            .entry(identity)
            .or_default()
            .insert(session_id.to_string());

        let released = match previous {
            Some(old) if old != identity => self.release(old, session_id).then_some(old),
            _ => None,
        };

        // remove_connection may have run between the lookup and the insert
        if !self.connections.contains_key(session_id) {
            let released = released
                .into_iter()
                .chain(self.release(identity, session_id).then_some(identity))
                .collect();

            tracing::debug!(session_id = %session_id, "Connection closed during registration");

            return RegisterOutcome::Closed { released };
        }

        tracing::debug!(
            session_id = %session_id,
            identity = %identity,
            replaced = ?previous,
            "Connection registered"
        );

        RegisterOutcome::Registered { released }
    }

    /// Drop a connection
    ///
    /// Returns the connection's identity when this was its last live
    /// connection.
    pub async fn remove_connection(&self, session_id: &str) -> Option<Snowflake> {
        let (_, connection) = self.connections.remove(session_id)?;
        let identity = connection.identity().await;

        tracing::debug!(session_id = %session_id, "Connection removed");

        identity.filter(|id| self.release(*id, session_id))
    }

    /// Unlink a session from an identity; true when none remain
    fn release(&self, identity: Snowflake, session_id: &str) -> bool {
        self.identities.alter(&identity, |_, mut sessions| {
            sessions.remove(session_id);
            sessions
        });

        self.identities
            .remove_if(&identity, |_, sessions| sessions.is_empty())
            .is_some()
    }

    /// Get a connection by session ID
    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    /// All connections registered under an identity
    pub fn connections_for(&self, identity: Snowflake) -> Vec<Arc<Connection>> {
        self.identities
            .get(&identity)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|sid| self.connections.get(sid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_online(&self, identity: Snowflake) -> bool {
        self.identities.contains_key(&identity)
    }

    /// Queue a payload on every connection of an identity
    ///
    /// Never waits on a slow client: a full queue drops the payload for that
    /// connection, and connections closing mid-broadcast are skipped.
    pub fn send_to_identity(&self, identity: Snowflake, message: &ServerEvent) -> usize {
        let mut sent = 0;

        for conn in self.connections_for(identity) {
            match conn.try_send(message.clone()) {
                Ok(()) => sent += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        session_id = %conn.session_id(),
                        key = %message.key,
                        "Outbound queue full, payload dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(session_id = %conn.session_id(), "Skipping closed connection");
                }
            }
        }

        tracing::trace!(identity = %identity, key = %message.key, sent, "Payload queued");

        sent
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of identities with at least one live connection
    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    /// Check if a session exists
    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .field("identities", &self.identities.len())
            .finish()
    }
}
