//! Channel, Group and Conversation entity <-> model mappers

use chrono::{DateTime, Utc};

use chat_core::entities::{Channel, Conversation, Group};
use chat_core::value_objects::Snowflake;

use crate::models::{ConversationModel, RoomModel};

impl From<RoomModel> for Channel {
    fn from(model: RoomModel) -> Self {
        Channel {
            id: Snowflake::new(model.id),
            name: model.name,
            description: model.description,
            image: model.image,
            owner_id: Snowflake::new(model.owner_id),
            last_message: model.last_message,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<RoomModel> for Group {
    fn from(model: RoomModel) -> Self {
        Group {
            id: Snowflake::new(model.id),
            name: model.name,
            description: model.description,
            image: model.image,
            owner_id: Snowflake::new(model.owner_id),
            last_message: model.last_message,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: Snowflake::new(model.id),
            member_one_id: Snowflake::new(model.member_one_id),
            member_two_id: Snowflake::new(model.member_two_id),
            last_message: model.last_message,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Values for inserting a channel or group row
pub struct RoomInsert<'a> {
    pub id: i64,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

impl<'a> RoomInsert<'a> {
    pub fn channel(channel: &'a Channel) -> Self {
        Self {
            id: channel.id.into_inner(),
            name: &channel.name,
            description: channel.description.as_deref(),
            image: channel.image.as_deref(),
            owner_id: channel.owner_id.into_inner(),
            created_at: channel.created_at,
        }
    }

    pub fn group(group: &'a Group) -> Self {
        Self {
            id: group.id.into_inner(),
            name: &group.name,
            description: group.description.as_deref(),
            image: group.image.as_deref(),
            owner_id: group.owner_id.into_inner(),
            created_at: group.created_at,
        }
    }
}
