//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::{ContainerRef, Message};
use chat_core::error::DomainError;
use chat_core::traits::{MessageQuery, MessageRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::mappers::{messages_from_models, MessageInsert};
use crate::models::MessageModel;

use super::error::map_db_error;

/// Message columns plus the aggregated reader ids
const MESSAGE_SELECT: &str = r"
    SELECT m.id, m.container_kind, m.container_id, m.owner_id, m.content, m.files,
           m.reply_id, m.deleted, m.is_read,
           COALESCE(
               (SELECT array_agg(r.profile_id ORDER BY r.profile_id)
                FROM message_reads r WHERE r.message_id = m.id),
               '{}'::BIGINT[]
           ) AS read_by,
           m.created_at, m.edited_at
    FROM messages m
";

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sort key of the cursor row, if it belongs to `container`
    async fn cursor_position(
        &self,
        container: ContainerRef,
        cursor: Snowflake,
    ) -> RepoResult<DateTime<Utc>> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r"
            SELECT created_at FROM messages
            WHERE id = $1 AND container_kind = $2 AND container_id = $3
            ",
        )
        .bind(cursor.into_inner())
        .bind(container.kind.as_str())
        .bind(container.id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(|(created_at,)| created_at)
            .ok_or(DomainError::InvalidCursor(cursor))
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(&format!("{MESSAGE_SELECT} WHERE m.id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Message::try_from).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Message>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();

        let results =
            sqlx::query_as::<_, MessageModel>(&format!("{MESSAGE_SELECT} WHERE m.id = ANY($1)"))
                .bind(raw)
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_error)?;

        messages_from_models(results)
    }

    #[instrument(skip(self), fields(container = %container))]
    async fn find_page(
        &self,
        container: ContainerRef,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = query.limit.max(1);

        let results = match query.cursor {
            Some(cursor) => {
                let created_at = self.cursor_position(container, cursor).await?;
                // Rows strictly after the cursor in (created_at DESC, id DESC) order
                sqlx::query_as::<_, MessageModel>(&format!(
                    r"{MESSAGE_SELECT}
                    WHERE m.container_kind = $1 AND m.container_id = $2
                      AND (m.created_at, m.id) < ($3, $4)
                    ORDER BY m.created_at DESC, m.id DESC
                    LIMIT $5
                    "
                ))
                .bind(container.kind.as_str())
                .bind(container.id.into_inner())
                .bind(created_at)
                .bind(cursor.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, MessageModel>(&format!(
                    r"{MESSAGE_SELECT}
                    WHERE m.container_kind = $1 AND m.container_id = $2
                    ORDER BY m.created_at DESC, m.id DESC
                    LIMIT $3
                    "
                ))
                .bind(container.kind.as_str())
                .bind(container.id.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_db_error)?;

        messages_from_models(results)
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let insert = MessageInsert::new(message)?;

        sqlx::query(
            r"
            INSERT INTO messages (id, container_kind, container_id, owner_id, content, files,
                                  reply_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(insert.id)
        .bind(insert.container_kind)
        .bind(insert.container_id)
        .bind(insert.owner_id)
        .bind(insert.content)
        .bind(insert.files)
        .bind(insert.reply_id)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn update(&self, message: &Message) -> RepoResult<()> {
        let insert = MessageInsert::new(message)?;

        let result = sqlx::query(
            r"
            UPDATE messages
            SET content = $2, files = $3, deleted = $4, edited_at = $5
            WHERE id = $1
            ",
        )
        .bind(insert.id)
        .bind(insert.content)
        .bind(insert.files)
        .bind(message.deleted)
        .bind(message.edited_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MessageNotFound(message.id));
        }

        Ok(())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn add_reader(&self, message: &Message, reader_id: Snowflake) -> RepoResult<bool> {
        let result = if message.container.kind.tracks_single_reader() {
            sqlx::query("UPDATE messages SET is_read = TRUE WHERE id = $1 AND NOT is_read")
                .bind(message.id.into_inner())
                .execute(&self.pool)
                .await
        } else {
            sqlx::query(
                r"
                INSERT INTO message_reads (message_id, profile_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(message.id.into_inner())
            .bind(reader_id.into_inner())
            .execute(&self.pool)
            .await
        }
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
