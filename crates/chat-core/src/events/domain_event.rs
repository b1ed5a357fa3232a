//! Domain events - emitted after a write has been persisted
//!
//! Every event carries the container it concerns and the resolved recipient
//! ids. The publisher never goes back to the store: routing is a pure
//! function of the event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::ContainerRef;
use crate::value_objects::Snowflake;

/// All possible domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    MessageCreated(MessageEvent),
    /// Edit or soft delete; the payload is the record as stored afterwards
    MessageUpdated(MessageEvent),
    MessageRead(MessageReadEvent),
    ContainerCreated(ContainerCreatedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageCreated(_) => "message.created",
            Self::MessageUpdated(_) => "message.updated",
            Self::MessageRead(_) => "message.read",
            Self::ContainerCreated(_) => "container.created",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MessageCreated(e) | Self::MessageUpdated(e) => e.timestamp,
            Self::MessageRead(e) => e.timestamp,
            Self::ContainerCreated(e) => e.timestamp,
        }
    }

    pub fn container(&self) -> ContainerRef {
        match self {
            Self::MessageCreated(e) | Self::MessageUpdated(e) => e.container,
            Self::MessageRead(e) => e.container,
            Self::ContainerCreated(e) => e.container,
        }
    }

    /// Profiles this event should reach
    pub fn recipients(&self) -> &[Snowflake] {
        match self {
            Self::MessageCreated(e) | Self::MessageUpdated(e) => &e.recipients,
            Self::MessageRead(e) => &e.recipients,
            Self::ContainerCreated(e) => &e.recipients,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub container: ContainerRef,
    pub message_id: Snowflake,
    pub recipients: Vec<Snowflake>,
    /// New lastMessage preview, set only for created messages
    pub last_message: Option<String>,
    /// Hydrated message as sent to clients
    pub message: Value,
    pub timestamp: DateTime<Utc>,
}

impl MessageEvent {
    pub fn new(
        container: ContainerRef,
        message_id: Snowflake,
        recipients: Vec<Snowflake>,
        message: Value,
    ) -> Self {
        Self {
            container,
            message_id,
            recipients,
            last_message: None,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn with_last_message(mut self, preview: Option<String>) -> Self {
        self.last_message = preview;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReadEvent {
    pub container: ContainerRef,
    pub message_id: Snowflake,
    pub reader_id: Snowflake,
    pub recipients: Vec<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerCreatedEvent {
    pub container: ContainerRef,
    pub recipients: Vec<Snowflake>,
    /// Container as returned to the creator
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}
