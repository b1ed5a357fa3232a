//! PostgreSQL implementation of ContainerRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::{
    Channel, Container, ContainerKind, ContainerRef, Conversation, Group,
};
use chat_core::error::DomainError;
use chat_core::traits::{ContainerRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::mappers::RoomInsert;
use crate::models::{ConversationModel, RoomModel};

use super::error::{like_pattern, map_db_error, map_unique_violation};

const ROOM_COLUMNS: &str =
    "id, name, description, image, owner_id, last_message, created_at, updated_at";
const CONVERSATION_COLUMNS: &str =
    "id, member_one_id, member_two_id, last_message, created_at, updated_at";

/// Table holding rows of a container kind
fn table(kind: ContainerKind) -> &'static str {
    match kind {
        ContainerKind::Channel => "channels",
        ContainerKind::Group => "chat_groups",
        ContainerKind::Conversation => "conversations",
    }
}

/// PostgreSQL implementation of ContainerRepository
#[derive(Clone)]
pub struct PgContainerRepository {
    pool: PgPool,
}

impl PgContainerRepository {
    /// Create a new PgContainerRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_room(&self, kind: ContainerKind, id: Snowflake) -> RepoResult<Option<RoomModel>> {
        sqlx::query_as::<_, RoomModel>(&format!(
            "SELECT {ROOM_COLUMNS} FROM {} WHERE id = $1",
            table(kind)
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn insert_room(
        &self,
        kind: ContainerKind,
        room: RoomInsert<'_>,
        member_ids: &[Snowflake],
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(&format!(
            r"
            INSERT INTO {} (id, name, description, image, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ",
            table(kind)
        ))
        .bind(room.id)
        .bind(room.name)
        .bind(room.description)
        .bind(room.image)
        .bind(room.owner_id)
        .bind(room.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let members: Vec<i64> = std::iter::once(room.owner_id)
            .chain(member_ids.iter().map(|id| id.into_inner()))
            .collect();

        sqlx::query(
            r"
            INSERT INTO container_members (container_kind, container_id, profile_id)
            SELECT $1, $2, profile_id FROM UNNEST($3::BIGINT[]) AS profile_id
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(kind.as_str())
        .bind(room.id)
        .bind(members)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)
    }
}

#[async_trait]
impl ContainerRepository for PgContainerRepository {
    #[instrument(skip(self), fields(container = %reference))]
    async fn find(&self, reference: ContainerRef) -> RepoResult<Option<Container>> {
        let container = match reference.kind {
            ContainerKind::Channel => self
                .find_room(reference.kind, reference.id)
                .await?
                .map(|m| Container::Channel(Channel::from(m))),
            ContainerKind::Group => self
                .find_room(reference.kind, reference.id)
                .await?
                .map(|m| Container::Group(Group::from(m))),
            ContainerKind::Conversation => sqlx::query_as::<_, ConversationModel>(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
            ))
            .bind(reference.id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?
            .map(|m| Container::Conversation(Conversation::from(m))),
        };

        Ok(container)
    }

    #[instrument(skip(self))]
    async fn find_conversation_between(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(&format!(
            r"
            SELECT {CONVERSATION_COLUMNS} FROM conversations
            WHERE (member_one_id = $1 AND member_two_id = $2)
               OR (member_one_id = $2 AND member_two_id = $1)
            LIMIT 1
            "
        ))
        .bind(a.into_inner())
        .bind(b.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    async fn create_channel(&self, channel: &Channel) -> RepoResult<()> {
        self.insert_room(ContainerKind::Channel, RoomInsert::channel(channel), &[])
            .await
    }

    #[instrument(skip(self, group, member_ids), fields(group_id = %group.id))]
    async fn create_group(&self, group: &Group, member_ids: &[Snowflake]) -> RepoResult<()> {
        self.insert_room(ContainerKind::Group, RoomInsert::group(group), member_ids)
            .await
    }

    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn create_conversation(&self, conversation: &Conversation) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO conversations (id, member_one_id, member_two_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ",
        )
        .bind(conversation.id.into_inner())
        .bind(conversation.member_one_id.into_inner())
        .bind(conversation.member_two_id.into_inner())
        .bind(conversation.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ConversationExists))?;

        Ok(())
    }

    #[instrument(skip(self), fields(container = %reference))]
    async fn add_member(&self, reference: ContainerRef, profile_id: Snowflake) -> RepoResult<bool> {
        if reference.kind == ContainerKind::Conversation {
            return Err(DomainError::Validation(
                "conversations have a fixed pair of members".to_string(),
            ));
        }

        let result = sqlx::query(
            r"
            INSERT INTO container_members (container_kind, container_id, profile_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(reference.kind.as_str())
        .bind(reference.id.into_inner())
        .bind(profile_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(container = %reference))]
    async fn member_ids(&self, reference: ContainerRef) -> RepoResult<Vec<Snowflake>> {
        if reference.kind == ContainerKind::Conversation {
            let pair: Option<(i64, i64)> = sqlx::query_as(
                "SELECT member_one_id, member_two_id FROM conversations WHERE id = $1",
            )
            .bind(reference.id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

            return Ok(pair
                .map(|(a, b)| vec![Snowflake::new(a), Snowflake::new(b)])
                .unwrap_or_default());
        }

        let ids: Vec<(i64,)> = sqlx::query_as(
            r"
            SELECT profile_id FROM container_members
            WHERE container_kind = $1 AND container_id = $2
            ORDER BY joined_at, profile_id
            ",
        )
        .bind(reference.kind.as_str())
        .bind(reference.id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(|(id,)| Snowflake::new(id)).collect())
    }

    #[instrument(skip(self, preview), fields(container = %reference))]
    async fn update_last_message(
        &self,
        reference: ContainerRef,
        preview: Option<&str>,
    ) -> RepoResult<()> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET last_message = $2, updated_at = NOW() WHERE id = $1",
            table(reference.kind)
        ))
        .bind(reference.id.into_inner())
        .bind(preview)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(match reference.kind {
                ContainerKind::Channel => DomainError::ChannelNotFound(reference.id),
                ContainerKind::Group => DomainError::GroupNotFound(reference.id),
                ContainerKind::Conversation => DomainError::ConversationNotFound(reference.id),
            });
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, profile_id: Snowflake) -> RepoResult<Vec<Container>> {
        let mut containers = Vec::new();

        for kind in [ContainerKind::Channel, ContainerKind::Group] {
            let rooms = sqlx::query_as::<_, RoomModel>(&format!(
                r"
                SELECT r.id, r.name, r.description, r.image, r.owner_id, r.last_message,
                       r.created_at, r.updated_at
                FROM {} r
                JOIN container_members m
                  ON m.container_kind = $1 AND m.container_id = r.id
                WHERE m.profile_id = $2
                ORDER BY r.updated_at DESC
                ",
                table(kind)
            ))
            .bind(kind.as_str())
            .bind(profile_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

            containers.extend(rooms.into_iter().map(|m| match kind {
                ContainerKind::Channel => Container::Channel(Channel::from(m)),
                _ => Container::Group(Group::from(m)),
            }));
        }

        let conversations = sqlx::query_as::<_, ConversationModel>(&format!(
            r"
            SELECT {CONVERSATION_COLUMNS} FROM conversations
            WHERE member_one_id = $1 OR member_two_id = $1
            ORDER BY updated_at DESC
            "
        ))
        .bind(profile_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        containers.extend(
            conversations
                .into_iter()
                .map(|m| Container::Conversation(Conversation::from(m))),
        );

        Ok(containers)
    }

    #[instrument(skip(self))]
    async fn search_channels(&self, query: &str, limit: i64) -> RepoResult<Vec<Channel>> {
        let results = sqlx::query_as::<_, RoomModel>(&format!(
            "SELECT {ROOM_COLUMNS} FROM channels WHERE name ILIKE $1 ORDER BY name LIMIT $2"
        ))
        .bind(like_pattern(query))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Channel::from).collect())
    }
}
