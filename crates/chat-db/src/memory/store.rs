use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

use chat_core::entities::{
    Channel, Container, ContainerKind, ContainerRef, Conversation, Group, Message, Profile,
};
use chat_core::error::DomainError;
use chat_core::traits::{
    ContainerRepository, MessageQuery, MessageRepository, ProfileRepository, RepoResult,
};
use chat_core::value_objects::Snowflake;

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<Snowflake, Profile>,
    channels: HashMap<Snowflake, Channel>,
    groups: HashMap<Snowflake, Group>,
    conversations: HashMap<Snowflake, Conversation>,
    /// Membership rows in join order
    members: HashMap<ContainerRef, Vec<Snowflake>>,
    messages: HashMap<Snowflake, Message>,
}

impl Tables {
    fn container(&self, reference: ContainerRef) -> Option<Container> {
        match reference.kind {
            ContainerKind::Channel => self.channels.get(&reference.id).cloned().map(Container::Channel),
            ContainerKind::Group => self.groups.get(&reference.id).cloned().map(Container::Group),
            ContainerKind::Conversation => self
                .conversations
                .get(&reference.id)
                .cloned()
                .map(Container::Conversation),
        }
    }

    fn join(&mut self, reference: ContainerRef, profile_id: Snowflake) -> bool {
        let members = self.members.entry(reference).or_default();
        if members.contains(&profile_id) {
            false
        } else {
            members.push(profile_id);
            true
        }
    }

    fn is_member(&self, reference: ContainerRef, profile_id: Snowflake) -> bool {
        self.members
            .get(&reference)
            .is_some_and(|m| m.contains(&profile_id))
    }
}

/// Repository implementation backed by in-memory maps
///
/// Cloning is cheap and every clone sees the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> usize {
        self.tables.read().messages.len()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn limit_to_usize(limit: i64) -> usize {
    usize::try_from(limit.max(0)).unwrap_or(usize::MAX)
}

// ============================================================================
// Profile Repository
// ============================================================================

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Profile>> {
        Ok(self.tables.read().profiles.get(&id).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<Profile>> {
        Ok(self
            .tables
            .read()
            .profiles
            .values()
            .find(|p| p.external_id == external_id)
            .cloned())
    }

    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Profile>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.profiles.get(id).cloned())
            .collect())
    }

    async fn create(&self, profile: &Profile) -> RepoResult<()> {
        let mut tables = self.tables.write();
        if tables
            .profiles
            .values()
            .any(|p| p.external_id == profile.external_id)
        {
            return Err(DomainError::ProfileAlreadyExists(profile.external_id.clone()));
        }
        tables.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn update(&self, profile: &Profile) -> RepoResult<()> {
        let mut tables = self.tables.write();
        match tables.profiles.get_mut(&profile.id) {
            Some(stored) => {
                *stored = profile.clone();
                Ok(())
            }
            None => Err(DomainError::ProfileNotFound(profile.id.to_string())),
        }
    }

    async fn search(&self, query: &str, limit: i64) -> RepoResult<Vec<Profile>> {
        let tables = self.tables.read();
        let mut found: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| contains_ci(&p.name, query))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found.truncate(limit_to_usize(limit));
        Ok(found)
    }
}

// ============================================================================
// Container Repository
// ============================================================================

#[async_trait]
impl ContainerRepository for MemoryStore {
    async fn find(&self, reference: ContainerRef) -> RepoResult<Option<Container>> {
        Ok(self.tables.read().container(reference))
    }

    async fn find_conversation_between(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<Option<Conversation>> {
        Ok(self
            .tables
            .read()
            .conversations
            .values()
            .find(|c| c.is_between(a, b))
            .cloned())
    }

    async fn create_channel(&self, channel: &Channel) -> RepoResult<()> {
        let mut tables = self.tables.write();
        tables.channels.insert(channel.id, channel.clone());
        tables.join(ContainerRef::channel(channel.id), channel.owner_id);
        Ok(())
    }

    async fn create_group(&self, group: &Group, member_ids: &[Snowflake]) -> RepoResult<()> {
        let mut tables = self.tables.write();
        let reference = ContainerRef::group(group.id);
        tables.groups.insert(group.id, group.clone());
        tables.join(reference, group.owner_id);
        for member in member_ids {
            tables.join(reference, *member);
        }
        Ok(())
    }

    async fn create_conversation(&self, conversation: &Conversation) -> RepoResult<()> {
        let mut tables = self.tables.write();
        let exists = tables
            .conversations
            .values()
            .any(|c| c.is_between(conversation.member_one_id, conversation.member_two_id));
        if exists {
            return Err(DomainError::ConversationExists);
        }
        tables
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn add_member(&self, reference: ContainerRef, profile_id: Snowflake) -> RepoResult<bool> {
        if reference.kind == ContainerKind::Conversation {
            return Err(DomainError::Validation(
                "conversations have a fixed pair of members".to_string(),
            ));
        }
        Ok(self.tables.write().join(reference, profile_id))
    }

    async fn member_ids(&self, reference: ContainerRef) -> RepoResult<Vec<Snowflake>> {
        let tables = self.tables.read();
        if reference.kind == ContainerKind::Conversation {
            return Ok(tables
                .conversations
                .get(&reference.id)
                .map(Conversation::member_ids)
                .unwrap_or_default());
        }
        Ok(tables.members.get(&reference).cloned().unwrap_or_default())
    }

    async fn update_last_message(
        &self,
        reference: ContainerRef,
        preview: Option<&str>,
    ) -> RepoResult<()> {
        let mut tables = self.tables.write();
        let preview = preview.map(String::from);
        let now = Utc::now();
        match reference.kind {
            ContainerKind::Channel => {
                let channel = tables
                    .channels
                    .get_mut(&reference.id)
                    .ok_or(DomainError::ChannelNotFound(reference.id))?;
                channel.last_message = preview;
                channel.updated_at = now;
            }
            ContainerKind::Group => {
                let group = tables
                    .groups
                    .get_mut(&reference.id)
                    .ok_or(DomainError::GroupNotFound(reference.id))?;
                group.last_message = preview;
                group.updated_at = now;
            }
            ContainerKind::Conversation => {
                let conversation = tables
                    .conversations
                    .get_mut(&reference.id)
                    .ok_or(DomainError::ConversationNotFound(reference.id))?;
                conversation.last_message = preview;
                conversation.updated_at = now;
            }
        }
        Ok(())
    }

    async fn find_by_member(&self, profile_id: Snowflake) -> RepoResult<Vec<Container>> {
        let tables = self.tables.read();

        let mut channels: Vec<&Channel> = tables
            .channels
            .values()
            .filter(|c| tables.is_member(ContainerRef::channel(c.id), profile_id))
            .collect();
        channels.sort_by_key(|c| Reverse(c.updated_at));

        let mut groups: Vec<&Group> = tables
            .groups
            .values()
            .filter(|g| tables.is_member(ContainerRef::group(g.id), profile_id))
            .collect();
        groups.sort_by_key(|g| Reverse(g.updated_at));

        let mut conversations: Vec<&Conversation> = tables
            .conversations
            .values()
            .filter(|c| c.involves(profile_id))
            .collect();
        conversations.sort_by_key(|c| Reverse(c.updated_at));

        Ok(channels
            .into_iter()
            .cloned()
            .map(Container::Channel)
            .chain(groups.into_iter().cloned().map(Container::Group))
            .chain(conversations.into_iter().cloned().map(Container::Conversation))
            .collect())
    }

    async fn search_channels(&self, query: &str, limit: i64) -> RepoResult<Vec<Channel>> {
        let tables = self.tables.read();
        let mut found: Vec<Channel> = tables
            .channels
            .values()
            .filter(|c| contains_ci(&c.name, query))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found.truncate(limit_to_usize(limit));
        Ok(found)
    }
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.tables.read().messages.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Message>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.messages.get(id).cloned())
            .collect())
    }

    async fn find_page(
        &self,
        container: ContainerRef,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let tables = self.tables.read();

        let mut history: Vec<&Message> = tables
            .messages
            .values()
            .filter(|m| m.container == container)
            .collect();
        history.sort_by_key(|m| Reverse((m.created_at, m.id)));

        let start = match query.cursor {
            Some(cursor) => {
                let position = history
                    .iter()
                    .position(|m| m.id == cursor)
                    .ok_or(DomainError::InvalidCursor(cursor))?;
                position + 1
            }
            None => 0,
        };

        let page: Vec<Message> = history
            .into_iter()
            .skip(start)
            .take(limit_to_usize(query.limit.max(1)))
            .cloned()
            .collect();
        trace!(container = %container, start, returned = page.len(), "memory page");
        Ok(page)
    }

    async fn create(&self, message: &Message) -> RepoResult<()> {
        self.tables
            .write()
            .messages
            .insert(message.id, message.clone());
        Ok(())
    }

    async fn update(&self, message: &Message) -> RepoResult<()> {
        let mut tables = self.tables.write();
        let stored = tables
            .messages
            .get_mut(&message.id)
            .ok_or(DomainError::MessageNotFound(message.id))?;
        stored.content.clone_from(&message.content);
        stored.files.clone_from(&message.files);
        stored.deleted = message.deleted;
        stored.edited_at = message.edited_at;
        Ok(())
    }

    async fn add_reader(&self, message: &Message, reader_id: Snowflake) -> RepoResult<bool> {
        let mut tables = self.tables.write();
        let stored = tables
            .messages
            .get_mut(&message.id)
            .ok_or(DomainError::MessageNotFound(message.id))?;
        Ok(stored.mark_read_by(reader_id))
    }
}
