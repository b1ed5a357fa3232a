//! Message service
//!
//! Handles the message lifecycle (send, edit, soft delete, read receipts)
//! for every container kind. Each write is persisted first and then handed
//! to the publisher; a failed fan-out never undoes the write.

use tracing::{info, instrument, warn};

use chat_core::entities::{Container, ContainerKind, ContainerRef, Message, Profile};
use chat_core::events::{DomainEvent, MessageEvent, MessageReadEvent};
use chat_core::{DomainError, Snowflake};

use crate::dto::{EditMessageRequest, MessageResponse, ReadReceiptResponse, SendMessageRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::hydrate::{container_not_found, event_payload, hydrate_message};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post a message into a channel, group or conversation
    ///
    /// Channels take posts from their owner only; groups and conversations
    /// from any member. The container's lastMessage preview is refreshed
    /// after the message is stored, and a failure there is only logged.
    #[instrument(skip(self, request), fields(sender = %request.profile_id))]
    pub async fn send_message(
        &self,
        kind: ContainerKind,
        container_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let reference = ContainerRef::new(kind, container_id);
        let sender_id = request.profile_id;

        let content = request.content.filter(|c| !c.trim().is_empty());
        let files = request.files.filter(|f| !f.is_empty());
        let message = Message::new(self.ctx.generate_id(), reference, sender_id, content, files)
            .with_reply(request.reply_id);

        if !message.has_body() {
            return Err(DomainError::EmptyMessage.into());
        }

        self.require_profile(sender_id).await?;

        let container = self
            .ctx
            .container_repo()
            .find(reference)
            .await?
            .ok_or_else(|| container_not_found(reference))?;

        let member_ids = self.ctx.container_repo().member_ids(reference).await?;
        if !container.can_post(sender_id, &member_ids) {
            return Err(not_allowed_to_post(&container).into());
        }

        if let Some(reply_id) = message.reply_id {
            let target = self.ctx.message_repo().find_by_id(reply_id).await?;
            if target.map_or(true, |t| t.container != reference) {
                return Err(ServiceError::validation(
                    "reply target must be a message in the same container",
                ));
            }
        }

        self.ctx.message_repo().create(&message).await?;

        let preview = message.preview(self.ctx.message_config().preview_length);
        if let Err(e) = self
            .ctx
            .container_repo()
            .update_last_message(reference, Some(&preview))
            .await
        {
            warn!(container = %reference, error = %e, "Failed to update lastMessage cache");
        }

        let response = hydrate_message(self.ctx, &message).await?;

        info!(message_id = %message.id, container = %reference, "Message sent");

        let event = MessageEvent::new(reference, message.id, member_ids, event_payload(&response))
            .with_last_message(Some(preview));
        self.ctx.publish(DomainEvent::MessageCreated(event)).await;

        Ok(response)
    }

    /// Replace the text of a message. Only its owner may edit it.
    #[instrument(skip(self, request), fields(editor = %request.profile_id))]
    pub async fn edit_message(
        &self,
        message_id: Snowflake,
        request: EditMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.require_message(message_id).await?;

        if message.owner_id != request.profile_id {
            return Err(DomainError::NotMessageOwner.into());
        }
        if message.deleted {
            return Err(ServiceError::validation("deleted messages cannot be edited"));
        }
        if request.content.trim().is_empty() {
            return Err(DomainError::EmptyMessage.into());
        }

        message.edit(request.content);
        self.ctx.message_repo().update(&message).await?;

        info!(message_id = %message_id, "Message edited");

        self.publish_update(&message).await
    }

    /// Soft delete: the row stays, its body becomes the tombstone text
    ///
    /// Deleting an already deleted message returns it unchanged and publishes nothing.
    #[instrument(skip(self))]
    pub async fn delete_message(
        &self,
        message_id: Snowflake,
        requester_id: Snowflake,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.require_message(message_id).await?;

        if message.owner_id != requester_id {
            return Err(DomainError::NotMessageOwner.into());
        }
        if message.deleted {
            return hydrate_message(self.ctx, &message).await;
        }

        message.tombstone();
        self.ctx.message_repo().update(&message).await?;

        info!(message_id = %message_id, "Message deleted");

        self.publish_update(&message).await
    }

    /// Record a read receipt
    ///
    /// In a conversation only the participant who did not send the message
    /// can mark it read, and the single read flag flips once. In groups and
    /// channels any member can, and each reader is recorded once. Repeating
    /// a receipt is a no-op and publishes nothing.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        message_id: Snowflake,
        reader_id: Snowflake,
    ) -> ServiceResult<ReadReceiptResponse> {
        let message = self.require_message(message_id).await?;
        self.require_profile(reader_id).await?;

        let reference = message.container;
        let container = self
            .ctx
            .container_repo()
            .find(reference)
            .await?
            .ok_or_else(|| container_not_found(reference))?;
        let member_ids = self.ctx.container_repo().member_ids(reference).await?;

        let changed = match &container {
            Container::Conversation(conversation) => {
                if reader_id == message.owner_id || !conversation.involves(reader_id) {
                    return Err(DomainError::NotConversationRecipient.into());
                }
                !message.read_state.is_read()
                    && self.ctx.message_repo().add_reader(&message, reader_id).await?
            }
            Container::Channel(_) | Container::Group(_) => {
                if !member_ids.contains(&reader_id) {
                    return Err(DomainError::NotContainerMember(reference.kind.as_str()).into());
                }
                reader_id != message.owner_id
                    && self.ctx.message_repo().add_reader(&message, reader_id).await?
            }
        };

        if changed {
            info!(message_id = %message_id, reader_id = %reader_id, "Message read");

            let event = MessageReadEvent {
                container: reference,
                message_id,
                reader_id,
                recipients: member_ids,
                timestamp: chrono::Utc::now(),
            };
            self.ctx.publish(DomainEvent::MessageRead(event)).await;
        }

        Ok(ReadReceiptResponse {
            message_id,
            reader_id,
            changed,
        })
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    async fn require_message(&self, message_id: Snowflake) -> ServiceResult<Message> {
        self.ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| DomainError::MessageNotFound(message_id).into())
    }

    async fn require_profile(&self, profile_id: Snowflake) -> ServiceResult<Profile> {
        self.ctx
            .profile_repo()
            .find_by_id(profile_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", profile_id.to_string()))
    }

    /// Hydrate an edited or deleted message and publish it on the update key
    async fn publish_update(&self, message: &Message) -> ServiceResult<MessageResponse> {
        let response = hydrate_message(self.ctx, message).await?;
        let member_ids = self.ctx.container_repo().member_ids(message.container).await?;

        let event = MessageEvent::new(
            message.container,
            message.id,
            member_ids,
            event_payload(&response),
        );
        self.ctx.publish(DomainEvent::MessageUpdated(event)).await;

        Ok(response)
    }
}

fn not_allowed_to_post(container: &Container) -> DomainError {
    match container {
        Container::Channel(_) => DomainError::NotChannelOwner,
        other => DomainError::NotContainerMember(other.kind().as_str()),
    }
}
