//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs, plus
//! constructors for the responses that need related records.

use chat_core::entities::{Channel, Conversation, Group, Message, Profile};

use super::responses::{
    ConversationResponse, MessageResponse, ProfileResponse, ReplyResponse, RoomResponse,
};

// ============================================================================
// Profile Mappers
// ============================================================================

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            external_id: profile.external_id.clone(),
            name: profile.name.clone(),
            image_url: profile.image_url.clone(),
            email: profile.email.clone(),
            online: profile.online,
            last_seen: profile.last_seen,
            created_at: profile.created_at,
        }
    }
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self::from(&profile)
    }
}

// ============================================================================
// Container Mappers
// ============================================================================

impl RoomResponse {
    pub fn channel(channel: &Channel, members: Vec<ProfileResponse>) -> Self {
        Self {
            id: channel.id,
            name: channel.name.clone(),
            description: channel.description.clone(),
            image: channel.image.clone(),
            owner_id: channel.owner_id,
            last_message: channel.last_message.clone(),
            members,
            created_at: channel.created_at,
            updated_at: channel.updated_at,
        }
    }

    pub fn group(group: &Group, members: Vec<ProfileResponse>) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            description: group.description.clone(),
            image: group.image.clone(),
            owner_id: group.owner_id,
            last_message: group.last_message.clone(),
            members,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

impl ConversationResponse {
    /// Attach whichever participant profiles were found
    pub fn new(conversation: &Conversation, profiles: &[Profile]) -> Self {
        let find = |id| profiles.iter().find(|p| p.id == id).map(ProfileResponse::from);
        Self {
            id: conversation.id,
            member_one_id: conversation.member_one_id,
            member_two_id: conversation.member_two_id,
            member_one: find(conversation.member_one_id),
            member_two: find(conversation.member_two_id),
            last_message: conversation.last_message.clone(),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl ReplyResponse {
    pub fn new(message: &Message, owner: Option<&Profile>) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            files: message.files.clone(),
            owner_id: message.owner_id,
            owner: owner.map(ProfileResponse::from),
            deleted: message.deleted,
            created_at: message.created_at,
        }
    }
}

impl MessageResponse {
    pub fn new(message: &Message, owner: Option<&Profile>, reply: Option<ReplyResponse>) -> Self {
        Self {
            id: message.id,
            container_type: message.container.kind,
            container_id: message.container.id,
            content: message.content.clone(),
            files: message.files.clone(),
            owner_id: message.owner_id,
            owner: owner.map(ProfileResponse::from),
            reply_id: message.reply_id,
            reply: reply.map(Box::new),
            deleted: message.deleted,
            is_read: message.read_state.is_read(),
            read_by: message.read_state.readers(),
            created_at: message.created_at,
            edited_at: message.edited_at,
        }
    }
}
