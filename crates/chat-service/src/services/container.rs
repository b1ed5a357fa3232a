//! Container service
//!
//! Creates and looks up channels, groups and conversations. Creation events
//! go to the invited profiles on their user-scoped keys.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info, instrument};

use chat_core::entities::{Channel, Container, ContainerRef, Conversation, Group, Profile};
use chat_core::events::{ContainerCreatedEvent, DomainEvent};
use chat_core::{DomainError, Snowflake};

use crate::dto::{
    ContainerResponse, ConversationResponse, CreateChannelRequest, CreateGroupRequest,
    ProfileResponse, RoomResponse, SearchResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::hydrate::{container_not_found, event_payload, hydrate_container};

/// Results per kind returned by `search`
const SEARCH_LIMIT: i64 = 10;

/// Container service
pub struct ContainerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ContainerService<'a> {
    /// Create a new ContainerService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a channel; the owner joins it
    #[instrument(skip(self, request), fields(owner = %request.owner_id))]
    pub async fn create_channel(&self, request: CreateChannelRequest) -> ServiceResult<ContainerResponse> {
        self.require_profiles(&[request.owner_id]).await?;

        let mut channel = Channel::new(self.ctx.generate_id(), request.name, request.owner_id);
        channel.description = request.description;
        channel.image = request.image;

        self.ctx.container_repo().create_channel(&channel).await?;

        info!(channel_id = %channel.id, "Channel created");

        let container = Container::Channel(channel);
        self.announce(&container, vec![request.owner_id]).await
    }

    /// Join a channel. Joining twice is a no-op.
    #[instrument(skip(self))]
    pub async fn join_channel(
        &self,
        channel_id: Snowflake,
        profile_id: Snowflake,
    ) -> ServiceResult<ContainerResponse> {
        let reference = ContainerRef::channel(channel_id);
        let container = self.require_container(reference).await?;
        self.require_profiles(&[profile_id]).await?;

        if self.ctx.container_repo().add_member(reference, profile_id).await? {
            info!(channel_id = %channel_id, profile_id = %profile_id, "Joined channel");
        }

        hydrate_container(self.ctx, &container).await
    }

    /// Create a group with its owner and invited members
    #[instrument(skip(self, request), fields(owner = %request.owner_id))]
    pub async fn create_group(&self, request: CreateGroupRequest) -> ServiceResult<ContainerResponse> {
        let invited: Vec<Snowflake> = request
            .member_ids
            .iter()
            .copied()
            .filter(|id| *id != request.owner_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut everyone = invited.clone();
        everyone.push(request.owner_id);
        self.require_profiles(&everyone).await?;

        let mut group = Group::new(self.ctx.generate_id(), request.name, request.owner_id);
        group.description = request.description;
        group.image = request.image;

        self.ctx.container_repo().create_group(&group, &invited).await?;

        info!(group_id = %group.id, members = invited.len() + 1, "Group created");

        let container = Container::Group(group);
        self.announce(&container, invited).await
    }

    /// Return the conversation between `a` and `b`, creating it if needed
    ///
    /// Both orderings are checked first. If another request creates the same
    /// pair in the meantime, the insert conflict is answered by reading that
    /// conversation back.
    #[instrument(skip(self))]
    pub async fn get_or_create_conversation(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> ServiceResult<ConversationResponse> {
        if a == b {
            return Err(DomainError::SelfConversation.into());
        }
        let profiles = self.require_profiles(&[a, b]).await?;

        if let Some(existing) = self.ctx.container_repo().find_conversation_between(a, b).await? {
            debug!(conversation_id = %existing.id, "Conversation already exists");
            return Ok(ConversationResponse::new(&existing, &profiles));
        }

        let conversation = Conversation::new(self.ctx.generate_id(), a, b);
        match self.ctx.container_repo().create_conversation(&conversation).await {
            Ok(()) => {}
            Err(DomainError::ConversationExists) => {
                let winner = self
                    .ctx
                    .container_repo()
                    .find_conversation_between(a, b)
                    .await?
                    .ok_or_else(|| ServiceError::conflict("conversation exists but cannot be read"))?;
                debug!(conversation_id = %winner.id, "Lost conversation creation race");
                return Ok(ConversationResponse::new(&winner, &profiles));
            }
            Err(e) => return Err(e.into()),
        }

        info!(conversation_id = %conversation.id, "Conversation created");

        let response = ConversationResponse::new(&conversation, &profiles);
        self.publish_created(
            ContainerRef::conversation(conversation.id),
            vec![a, b],
            event_payload(&ContainerResponse::Conversation(response.clone())),
        )
        .await;

        Ok(response)
    }

    /// Look up the conversation between two profiles, in either order
    #[instrument(skip(self))]
    pub async fn find_conversation(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> ServiceResult<ConversationResponse> {
        let conversation = self
            .ctx
            .container_repo()
            .find_conversation_between(a, b)
            .await?
            .ok_or_else(|| ServiceError::not_found("Conversation", format!("{a}/{b}")))?;
        let profiles = self.ctx.profile_repo().find_many(&[a, b]).await?;

        Ok(ConversationResponse::new(&conversation, &profiles))
    }

    #[instrument(skip(self))]
    pub async fn get_conversation(&self, id: Snowflake) -> ServiceResult<ContainerResponse> {
        let container = self.require_container(ContainerRef::conversation(id)).await?;
        hydrate_container(self.ctx, &container).await
    }

    #[instrument(skip(self))]
    pub async fn get_channel(&self, id: Snowflake) -> ServiceResult<ContainerResponse> {
        let container = self.require_container(ContainerRef::channel(id)).await?;
        hydrate_container(self.ctx, &container).await
    }

    #[instrument(skip(self))]
    pub async fn get_group(&self, id: Snowflake) -> ServiceResult<ContainerResponse> {
        let container = self.require_container(ContainerRef::group(id)).await?;
        hydrate_container(self.ctx, &container).await
    }

    /// Channels and profiles whose name contains `query`
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> ServiceResult<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::validation("search query must not be empty"));
        }

        let channels = self
            .ctx
            .container_repo()
            .search_channels(query, SEARCH_LIMIT)
            .await?;
        let profiles = self.ctx.profile_repo().search(query, SEARCH_LIMIT).await?;

        Ok(SearchResponse {
            channels: channels
                .iter()
                .map(|c| RoomResponse::channel(c, Vec::new()))
                .collect(),
            profiles: profiles.iter().map(ProfileResponse::from).collect(),
        })
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    async fn require_container(&self, reference: ContainerRef) -> ServiceResult<Container> {
        self.ctx
            .container_repo()
            .find(reference)
            .await?
            .ok_or_else(|| container_not_found(reference))
    }

    /// Load every profile in `ids`, failing on the first missing one
    async fn require_profiles(&self, ids: &[Snowflake]) -> ServiceResult<Vec<Profile>> {
        let profiles = self.ctx.profile_repo().find_many(ids).await?;
        if let Some(missing) = ids.iter().find(|id| !profiles.iter().any(|p| p.id == **id)) {
            return Err(ServiceError::not_found("Profile", missing.to_string()));
        }
        Ok(profiles)
    }

    /// Hydrate a freshly created room and tell `recipients` about it
    async fn announce(
        &self,
        container: &Container,
        recipients: Vec<Snowflake>,
    ) -> ServiceResult<ContainerResponse> {
        let response = hydrate_container(self.ctx, container).await?;
        self.publish_created(container.reference(), recipients, event_payload(&response))
            .await;
        Ok(response)
    }

    async fn publish_created(
        &self,
        container: ContainerRef,
        recipients: Vec<Snowflake>,
        data: serde_json::Value,
    ) {
        if recipients.is_empty() {
            return;
        }
        let event = ContainerCreatedEvent {
            container,
            recipients,
            data,
            timestamp: Utc::now(),
        };
        self.ctx.publish(DomainEvent::ContainerCreated(event)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chat_core::traits::{ContainerRepository, RepoResult};
    use chat_core::SnowflakeGenerator;
    use chat_db::MemoryStore;

    use crate::services::test_support::Fixture;

    fn group_request(owner: Snowflake, members: Vec<Snowflake>) -> CreateGroupRequest {
        CreateGroupRequest {
            name: "team".into(),
            description: None,
            image: None,
            owner_id: owner,
            member_ids: members,
        }
    }

    #[tokio::test]
    async fn test_conversation_is_found_in_either_order() {
        let fx = Fixture::new();
        let a = fx.profile("a").await;
        let b = fx.profile("b").await;
        let service = ContainerService::new(&fx.ctx);

        let created = service.get_or_create_conversation(a.id, b.id).await.unwrap();
        let again = service.get_or_create_conversation(b.id, a.id).await.unwrap();
        assert_eq!(created.id, again.id);
        assert_eq!(again.member_one.as_ref().map(|p| p.id), Some(a.id));

        // one creation, one event for both participants
        let events = fx.events.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipients(), &[a.id, b.id]);

        let found = service.find_conversation(b.id, a.id).await.unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_conversation_rejects_self_and_unknown_profiles() {
        let fx = Fixture::new();
        let a = fx.profile("a").await;
        let service = ContainerService::new(&fx.ctx);

        let err = service.get_or_create_conversation(a.id, a.id).await.unwrap_err();
        assert!(err.is_validation());

        let err = service
            .get_or_create_conversation(a.id, Snowflake::new(404))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .find_conversation(a.id, Snowflake::new(404))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    /// Container store whose first pair lookup misses, as if another
    /// request inserted the conversation right after we looked
    struct StaleLookup {
        inner: MemoryStore,
        missed: AtomicBool,
    }

    #[async_trait]
    impl ContainerRepository for StaleLookup {
        async fn find(&self, reference: ContainerRef) -> RepoResult<Option<Container>> {
            self.inner.find(reference).await
        }

        async fn find_conversation_between(
            &self,
            a: Snowflake,
            b: Snowflake,
        ) -> RepoResult<Option<Conversation>> {
            if self.missed.swap(true, Ordering::SeqCst) {
                self.inner.find_conversation_between(a, b).await
            } else {
                Ok(None)
            }
        }

        async fn create_channel(&self, channel: &Channel) -> RepoResult<()> {
            self.inner.create_channel(channel).await
        }

        async fn create_group(&self, group: &Group, member_ids: &[Snowflake]) -> RepoResult<()> {
            self.inner.create_group(group, member_ids).await
        }

        async fn create_conversation(&self, conversation: &Conversation) -> RepoResult<()> {
            self.inner.create_conversation(conversation).await
        }

        async fn add_member(&self, reference: ContainerRef, profile_id: Snowflake) -> RepoResult<bool> {
            self.inner.add_member(reference, profile_id).await
        }

        async fn member_ids(&self, reference: ContainerRef) -> RepoResult<Vec<Snowflake>> {
            self.inner.member_ids(reference).await
        }

        async fn update_last_message(
            &self,
            reference: ContainerRef,
            preview: Option<&str>,
        ) -> RepoResult<()> {
            self.inner.update_last_message(reference, preview).await
        }

        async fn find_by_member(&self, profile_id: Snowflake) -> RepoResult<Vec<Container>> {
            self.inner.find_by_member(profile_id).await
        }

        async fn search_channels(&self, query: &str, limit: i64) -> RepoResult<Vec<Channel>> {
            self.inner.search_channels(query, limit).await
        }
    }

    #[tokio::test]
    async fn test_lost_race_returns_existing_conversation() {
        let fx = Fixture::new();
        let a = fx.profile("a").await;
        let b = fx.profile("b").await;

        let winner = Conversation::new(fx.ctx.generate_id(), b.id, a.id);
        fx.store.create_conversation(&winner).await.unwrap();

        let ctx = ServiceContext::with_store(fx.store.clone())
            .container_repo(Arc::new(StaleLookup {
                inner: fx.store.clone(),
                missed: AtomicBool::new(false),
            }))
            .publisher(fx.events.clone())
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(2)))
            .storage_config(fx.ctx.storage_config().clone())
            .build()
            .unwrap();

        let response = ContainerService::new(&ctx)
            .get_or_create_conversation(a.id, b.id)
            .await
            .unwrap();
        assert_eq!(response.id, winner.id);
        assert!(fx.events.events().is_empty());
    }

    #[tokio::test]
    async fn test_group_creation_notifies_invited_members() {
        let fx = Fixture::new();
        let owner = fx.profile("owner").await;
        let one = fx.profile("one").await;
        let two = fx.profile("two").await;

        let response = ContainerService::new(&fx.ctx)
            .create_group(group_request(owner.id, vec![one.id, two.id, one.id, owner.id]))
            .await
            .unwrap();
        let ContainerResponse::Group(room) = &response else {
            panic!("expected a group");
        };
        assert_eq!(room.members.len(), 3);

        let events = fx.events.events();
        assert_eq!(events.len(), 1);
        let mut recipients = events[0].recipients().to_vec();
        recipients.sort();
        let mut expected = vec![one.id, two.id];
        expected.sort();
        assert_eq!(recipients, expected);
    }

    #[tokio::test]
    async fn test_group_with_unknown_member_fails() {
        let fx = Fixture::new();
        let owner = fx.profile("owner").await;

        let err = ContainerService::new(&fx.ctx)
            .create_group(group_request(owner.id, vec![Snowflake::new(9)]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(fx.events.events().is_empty());
    }

    #[tokio::test]
    async fn test_channel_create_and_join() {
        let fx = Fixture::new();
        let owner = fx.profile("owner").await;
        let reader = fx.profile("reader").await;
        let service = ContainerService::new(&fx.ctx);

        let created = service
            .create_channel(CreateChannelRequest {
                name: "Announcements".into(),
                description: Some("news".into()),
                image: None,
                owner_id: owner.id,
            })
            .await
            .unwrap();
        let channel_id = created.id();

        service.join_channel(channel_id, reader.id).await.unwrap();
        let joined = service.join_channel(channel_id, reader.id).await.unwrap();
        let ContainerResponse::Channel(room) = joined else {
            panic!("expected a channel");
        };
        assert_eq!(room.members.len(), 2);

        let members = fx
            .store
            .member_ids(ContainerRef::channel(channel_id))
            .await
            .unwrap();
        assert_eq!(members.len(), 2);

        let results = service.search("announce").await.unwrap();
        assert_eq!(results.channels.len(), 1);
        assert!(service.search("  ").await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_getters_report_missing_containers() {
        let fx = Fixture::new();
        let service = ContainerService::new(&fx.ctx);

        assert!(service.get_channel(Snowflake::new(1)).await.unwrap_err().is_not_found());
        assert!(service.get_group(Snowflake::new(1)).await.unwrap_err().is_not_found());
        assert!(service
            .get_conversation(Snowflake::new(1))
            .await
            .unwrap_err()
            .is_not_found());
    }
}
