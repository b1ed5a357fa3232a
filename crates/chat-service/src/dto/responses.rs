//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` with camelCase field names.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use chat_core::entities::MessageFiles;
use chat_core::{ContainerKind, Snowflake};

// ============================================================================
// Profile Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Snowflake,
    pub external_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Message Responses
// ============================================================================

/// Message hydrated with its owner and reply target
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Snowflake,
    pub container_type: ContainerKind,
    pub container_id: Snowflake,
    pub content: Option<String>,
    pub files: Option<MessageFiles>,
    pub owner_id: Snowflake,
    pub owner: Option<ProfileResponse>,
    pub reply_id: Option<Snowflake>,
    pub reply: Option<Box<ReplyResponse>>,
    pub deleted: bool,
    pub is_read: bool,
    /// Reader ids; always empty for conversation messages
    pub read_by: Vec<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

/// The message a reply points at
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    pub id: Snowflake,
    pub content: Option<String>,
    pub files: Option<MessageFiles>,
    pub owner_id: Snowflake,
    pub owner: Option<ProfileResponse>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// One batch of message history
///
/// `media`, `files` and `links` are views over `items`; a message can show
/// up in more than one of them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePageResponse {
    pub items: Vec<MessageResponse>,
    /// Set only when the batch came back full
    pub next_cursor: Option<Snowflake>,
    pub media: Vec<MessageResponse>,
    pub files: Vec<MessageResponse>,
    pub links: Vec<MessageResponse>,
    pub container: ContainerResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceiptResponse {
    pub message_id: Snowflake,
    pub reader_id: Snowflake,
    /// False when the reader had already been recorded
    pub changed: bool,
}

// ============================================================================
// Container Responses
// ============================================================================

/// Channel or group with its members
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: Snowflake,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub owner_id: Snowflake,
    pub last_message: Option<String>,
    pub members: Vec<ProfileResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Snowflake,
    pub member_one_id: Snowflake,
    pub member_two_id: Snowflake,
    pub member_one: Option<ProfileResponse>,
    pub member_two: Option<ProfileResponse>,
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Any container, tagged with its kind
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContainerResponse {
    Channel(RoomResponse),
    Group(RoomResponse),
    Conversation(ConversationResponse),
}

impl ContainerResponse {
    pub fn id(&self) -> Snowflake {
        match self {
            Self::Channel(r) | Self::Group(r) => r.id,
            Self::Conversation(c) => c.id,
        }
    }
}

/// Everything a profile belongs to, newest activity first per kind
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatsResponse {
    pub channels: Vec<RoomResponse>,
    pub groups: Vec<RoomResponse>,
    pub conversations: Vec<ConversationResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub channels: Vec<RoomResponse>,
    pub profiles: Vec<ProfileResponse>,
}

// ============================================================================
// Upload Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Stored names to put in a message's `fileUrls`
    pub file_urls: Vec<String>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}
