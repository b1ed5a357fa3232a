//! Hydration - attach related records to messages and containers
//!
//! Related rows are fetched in batches (one query for reply targets, one for
//! every profile involved) rather than per message.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use chat_core::entities::{Container, ContainerKind, ContainerRef, Message, Profile};
use chat_core::{DomainError, Snowflake};

use crate::dto::{
    ContainerResponse, ConversationResponse, MessageResponse, ProfileResponse, ReplyResponse,
    RoomResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

fn distinct(ids: impl Iterator<Item = Snowflake>) -> Vec<Snowflake> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}

/// Not-found error for a container reference
pub(crate) fn container_not_found(reference: ContainerRef) -> ServiceError {
    match reference.kind {
        ContainerKind::Channel => DomainError::ChannelNotFound(reference.id),
        ContainerKind::Group => DomainError::GroupNotFound(reference.id),
        ContainerKind::Conversation => DomainError::ConversationNotFound(reference.id),
    }
    .into()
}

/// Serialize a response for an event payload
///
/// Events are best-effort, so a serialization failure degrades to `null`.
pub(crate) fn event_payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to serialize event payload");
        Value::Null
    })
}

/// Messages with owner profiles and reply targets
///
/// A reply target is only attached when it lives in the same container as
/// the reply.
pub(crate) async fn hydrate_messages(
    ctx: &ServiceContext,
    messages: &[Message],
) -> ServiceResult<Vec<MessageResponse>> {
    let reply_ids = distinct(messages.iter().filter_map(|m| m.reply_id));
    let replies = if reply_ids.is_empty() {
        Vec::new()
    } else {
        ctx.message_repo().find_many(&reply_ids).await?
    };

    let owner_ids = distinct(
        messages
            .iter()
            .map(|m| m.owner_id)
            .chain(replies.iter().map(|r| r.owner_id)),
    );
    let profiles: HashMap<Snowflake, Profile> = ctx
        .profile_repo()
        .find_many(&owner_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let replies: HashMap<Snowflake, Message> = replies.into_iter().map(|r| (r.id, r)).collect();

    Ok(messages
        .iter()
        .map(|message| {
            let reply = message
                .reply_id
                .and_then(|id| replies.get(&id))
                .filter(|target| target.container == message.container)
                .map(|target| ReplyResponse::new(target, profiles.get(&target.owner_id)));
            MessageResponse::new(message, profiles.get(&message.owner_id), reply)
        })
        .collect())
}

pub(crate) async fn hydrate_message(
    ctx: &ServiceContext,
    message: &Message,
) -> ServiceResult<MessageResponse> {
    hydrate_messages(ctx, std::slice::from_ref(message))
        .await?
        .pop()
        .ok_or_else(|| ServiceError::internal("hydration dropped a message"))
}

/// Container with its member profiles, given the member ids already loaded
pub(crate) async fn hydrate_container_with(
    ctx: &ServiceContext,
    container: &Container,
    member_ids: &[Snowflake],
) -> ServiceResult<ContainerResponse> {
    let profiles = ctx.profile_repo().find_many(member_ids).await?;

    Ok(match container {
        Container::Channel(channel) => {
            ContainerResponse::Channel(RoomResponse::channel(channel, members(&profiles)))
        }
        Container::Group(group) => {
            ContainerResponse::Group(RoomResponse::group(group, members(&profiles)))
        }
        Container::Conversation(conversation) => {
            ContainerResponse::Conversation(ConversationResponse::new(conversation, &profiles))
        }
    })
}

pub(crate) async fn hydrate_container(
    ctx: &ServiceContext,
    container: &Container,
) -> ServiceResult<ContainerResponse> {
    let member_ids = ctx.container_repo().member_ids(container.reference()).await?;
    hydrate_container_with(ctx, container, &member_ids).await
}

fn members(profiles: &[Profile]) -> Vec<ProfileResponse> {
    profiles.iter().map(ProfileResponse::from).collect()
}
