//! Message entity <-> model mapper

use std::collections::BTreeSet;

use chat_core::entities::{ContainerKind, ContainerRef, Message, ReadState};
use chat_core::error::DomainError;
use chat_core::value_objects::Snowflake;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
///
/// Fails only when the stored container kind is not one we know.
impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let kind: ContainerKind = model.container_kind.parse().map_err(|_| {
            DomainError::Database(format!(
                "message {} has unknown container kind {}",
                model.id, model.container_kind
            ))
        })?;

        let read_state = if kind.tracks_single_reader() {
            ReadState::Flag(model.is_read)
        } else {
            ReadState::Readers(model.read_by.into_iter().map(Snowflake::new).collect::<BTreeSet<_>>())
        };

        Ok(Message {
            id: Snowflake::new(model.id),
            container: ContainerRef::new(kind, Snowflake::new(model.container_id)),
            owner_id: Snowflake::new(model.owner_id),
            content: model.content,
            files: model.files.map(|json| json.0),
            reply_id: model.reply_id.map(Snowflake::new),
            deleted: model.deleted,
            read_state,
            created_at: model.created_at,
            edited_at: model.edited_at,
        })
    }
}

/// Convert Message entity reference to values for database insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub container_kind: &'static str,
    pub container_id: i64,
    pub owner_id: i64,
    pub content: Option<&'a str>,
    pub files: Option<serde_json::Value>,
    pub reply_id: Option<i64>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Result<Self, DomainError> {
        let files = message
            .files
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| DomainError::Internal(format!("cannot encode files: {e}")))?;

        Ok(Self {
            id: message.id.into_inner(),
            container_kind: message.container.kind.as_str(),
            container_id: message.container.id.into_inner(),
            owner_id: message.owner_id.into_inner(),
            content: message.content.as_deref(),
            files,
            reply_id: message.reply_id.map(Snowflake::into_inner),
        })
    }
}

/// Map a batch of rows, failing on the first undecodable one
pub fn messages_from_models(models: Vec<MessageModel>) -> Result<Vec<Message>, DomainError> {
    models.into_iter().map(Message::try_from).collect()
}
