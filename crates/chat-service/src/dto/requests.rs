//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! The acting profile travels in the request itself (`profileId`); there is no
//! session to take it from.

use serde::Deserialize;
use validator::Validate;

use chat_core::entities::MessageFiles;
use chat_core::Snowflake;

// ============================================================================
// Profile Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    /// Identity provider id
    #[serde(alias = "userId")]
    #[validate(length(min = 1, max = 255, message = "External id must be 1-255 characters"))]
    pub external_id: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub image_url: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

// ============================================================================
// Container Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Channel name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub image: Option<String>,

    pub owner_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub image: Option<String>,

    pub owner_id: Snowflake,

    /// Invited members, the owner excluded
    #[serde(default)]
    #[validate(length(max = 256, message = "At most 256 members can be invited at once"))]
    pub member_ids: Vec<Snowflake>,
}

/// Body carrying only the acting profile
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActorRequest {
    pub profile_id: Snowflake,
}

/// Pair of conversation participants, in any order
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPairQuery {
    pub member_one_id: Snowflake,
    pub member_two_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 100, message = "Query must be 1-100 characters"))]
    pub q: String,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Send message request. Text, files or both must be present.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub profile_id: Snowflake,

    #[validate(length(max = 4000, message = "Message content must be at most 4000 characters"))]
    pub content: Option<String>,

    pub files: Option<MessageFiles>,

    pub reply_id: Option<Snowflake>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditMessageRequest {
    pub profile_id: Snowflake,

    #[validate(length(min = 1, max = 4000, message = "Message content must be 1-4000 characters"))]
    pub content: String,
}

/// History query: `?cursor=<messageId>&limit=<n>`
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct MessagePageQuery {
    pub cursor: Option<Snowflake>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}
