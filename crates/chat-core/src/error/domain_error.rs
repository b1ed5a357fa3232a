//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Group not found: {0}")]
    GroupNotFound(Snowflake),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Message must have content or files")]
    EmptyMessage,

    #[error("Invalid cursor: {0}")]
    InvalidCursor(Snowflake),

    #[error("Cannot start a conversation with yourself")]
    SelfConversation,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not message owner")]
    NotMessageOwner,

    #[error("Only the channel owner can post in this channel")]
    NotChannelOwner,

    #[error("Not a member of this {0}")]
    NotContainerMember(&'static str),

    #[error("Only the recipient can mark this message as read")]
    NotConversationRecipient,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Profile already exists for external id {0}")]
    ProfileAlreadyExists(String),

    #[error("Conversation already exists between these profiles")]
    ConversationExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ProfileNotFound(_) => "UNKNOWN_PROFILE",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::GroupNotFound(_) => "UNKNOWN_GROUP",
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",

            // Validation
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::InvalidCursor(_) => "INVALID_CURSOR",
            Self::SelfConversation => "SELF_CONVERSATION",

            // Authorization
            Self::NotMessageOwner => "NOT_MESSAGE_OWNER",
            Self::NotChannelOwner => "NOT_CHANNEL_OWNER",
            Self::NotContainerMember(_) => "NOT_MEMBER",
            Self::NotConversationRecipient => "NOT_RECIPIENT",

            // Conflict
            Self::ProfileAlreadyExists(_) => "PROFILE_ALREADY_EXISTS",
            Self::ConversationExists => "CONVERSATION_EXISTS",

            // Infrastructure
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProfileNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::GroupNotFound(_)
                | Self::ConversationNotFound(_)
                | Self::MessageNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::EmptyMessage | Self::InvalidCursor(_) | Self::SelfConversation
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotMessageOwner
                | Self::NotChannelOwner
                | Self::NotContainerMember(_)
                | Self::NotConversationRecipient
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ProfileAlreadyExists(_) | Self::ConversationExists)
    }
}
