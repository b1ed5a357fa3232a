//! Pagination service - cursor-delimited message history
//!
//! History is read newest first. A page carries a `nextCursor` only when it
//! came back full; a short page means the history is exhausted.

use tracing::{debug, instrument};

use chat_core::entities::{ContainerKind, ContainerRef, FileKind, Message};
use chat_core::traits::MessageQuery;
use chat_core::Snowflake;

use crate::dto::{MessagePageQuery, MessagePageResponse, MessageResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::hydrate::{container_not_found, hydrate_container, hydrate_messages};

/// Pagination service
pub struct PaginationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PaginationService<'a> {
    /// Create a new PaginationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// One batch of a container's history
    ///
    /// Without a cursor the batch starts at the newest message. With one it
    /// starts right after the cursor message, which is itself excluded. A
    /// cursor that is not a message of this container is rejected.
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        kind: ContainerKind,
        container_id: Snowflake,
        query: MessagePageQuery,
    ) -> ServiceResult<MessagePageResponse> {
        let reference = ContainerRef::new(kind, container_id);
        let container = self
            .ctx
            .container_repo()
            .find(reference)
            .await?
            .ok_or_else(|| container_not_found(reference))?;

        let batch_size = query
            .limit
            .unwrap_or(self.ctx.message_config().batch_size)
            .max(1);

        let messages = self
            .ctx
            .message_repo()
            .find_page(reference, MessageQuery::new(query.cursor, i64::from(batch_size)))
            .await?;

        let next_cursor = next_cursor(&messages, batch_size as usize);
        let items = hydrate_messages(self.ctx, &messages).await?;
        let (media, files, links) = categorize(&messages, &items);

        debug!(
            container = %reference,
            count = items.len(),
            has_more = next_cursor.is_some(),
            "Message page loaded"
        );

        Ok(MessagePageResponse {
            items,
            next_cursor,
            media,
            files,
            links,
            container: hydrate_container(self.ctx, &container).await?,
        })
    }
}

/// Id of the last message, only when the batch is exactly full
fn next_cursor(messages: &[Message], batch_size: usize) -> Option<Snowflake> {
    if messages.len() == batch_size {
        messages.last().map(|m| m.id)
    } else {
        None
    }
}

/// Split a batch into the media, files and links views
///
/// `messages` and `items` are parallel; the views hold copies of the
/// hydrated items.
fn categorize(
    messages: &[Message],
    items: &[MessageResponse],
) -> (Vec<MessageResponse>, Vec<MessageResponse>, Vec<MessageResponse>) {
    let mut media = Vec::new();
    let mut files = Vec::new();
    let mut links = Vec::new();

    for (message, item) in messages.iter().zip(items) {
        match message.file_kind() {
            Some(FileKind::Imgs) => media.push(item.clone()),
            Some(FileKind::Files) => files.push(item.clone()),
            _ => {}
        }
        if message.has_link() {
            links.push(item.clone());
        }
    }

    (media, files, links)
}
