//! Message database model

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use chat_core::entities::MessageFiles;

/// Database model for messages table, joined with its reader ids
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub container_kind: String,
    pub container_id: i64,
    pub owner_id: i64,
    pub content: Option<String>,
    pub files: Option<Json<MessageFiles>>,
    pub reply_id: Option<i64>,
    pub deleted: bool,
    pub is_read: bool,
    /// Aggregated from message_reads
    pub read_by: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}
