//! Profile service
//!
//! Profiles mirror identities issued by an external provider. This service
//! creates them, looks them up and tracks presence.

use chrono::Utc;
use tracing::{debug, info, instrument};

use chat_core::entities::Profile;
use chat_core::Snowflake;

use crate::dto::{ChatsResponse, ContainerResponse, CreateProfileRequest, ProfileResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::hydrate::hydrate_container;

/// Profile service
pub struct ProfileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProfileService<'a> {
    /// Create a new ProfileService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a profile for an external identity
    #[instrument(skip(self, request), fields(external_id = %request.external_id))]
    pub async fn create_profile(&self, request: CreateProfileRequest) -> ServiceResult<ProfileResponse> {
        let mut profile = Profile::new(self.ctx.generate_id(), request.external_id, request.name);
        profile.image_url = request.image_url;
        profile.email = request.email;

        self.ctx.profile_repo().create(&profile).await?;

        info!(profile_id = %profile.id, "Profile created");

        Ok(ProfileResponse::from(profile))
    }

    #[instrument(skip(self))]
    pub async fn get_profile_by_external_id(&self, external_id: &str) -> ServiceResult<ProfileResponse> {
        let profile = self
            .ctx
            .profile_repo()
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", external_id))?;

        Ok(ProfileResponse::from(profile))
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, id: Snowflake) -> ServiceResult<ProfileResponse> {
        Ok(ProfileResponse::from(self.require_profile(id).await?))
    }

    /// Stamp last-seen with the current time
    #[instrument(skip(self))]
    pub async fn touch_last_seen(&self, id: Snowflake) -> ServiceResult<ProfileResponse> {
        let mut profile = self.require_profile(id).await?;
        profile.last_seen = Some(Utc::now());
        self.ctx.profile_repo().update(&profile).await?;

        debug!(profile_id = %id, "Last seen updated");

        Ok(ProfileResponse::from(profile))
    }

    /// Set the online flag; going offline also stamps last-seen
    #[instrument(skip(self))]
    pub async fn set_presence(&self, id: Snowflake, online: bool) -> ServiceResult<ProfileResponse> {
        let mut profile = self.require_profile(id).await?;
        profile.set_online(online);
        self.ctx.profile_repo().update(&profile).await?;

        info!(profile_id = %id, online, "Presence updated");

        Ok(ProfileResponse::from(profile))
    }

    /// Every channel, group and conversation the profile belongs to, with members
    #[instrument(skip(self))]
    pub async fn list_chats(&self, id: Snowflake) -> ServiceResult<ChatsResponse> {
        self.require_profile(id).await?;

        let containers = self.ctx.container_repo().find_by_member(id).await?;
        let mut chats = ChatsResponse::default();

        for container in &containers {
            match hydrate_container(self.ctx, container).await? {
                ContainerResponse::Channel(room) => chats.channels.push(room),
                ContainerResponse::Group(room) => chats.groups.push(room),
                ContainerResponse::Conversation(conversation) => chats.conversations.push(conversation),
            }
        }

        Ok(chats)
    }

    async fn require_profile(&self, id: Snowflake) -> ServiceResult<Profile> {
        self.ctx
            .profile_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", id.to_string()))
    }
}
