//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Lookups return `Ok(None)` for absent rows so
//! callers can tell not-found apart from store failures.

use async_trait::async_trait;

use crate::entities::{Channel, Container, ContainerRef, Conversation, Group, Message, Profile};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Profile Repository
// ============================================================================

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find profile by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Profile>>;

    /// Find profile by the identity provider's id
    async fn find_by_external_id(&self, external_id: &str) -> RepoResult<Option<Profile>>;

    /// Fetch several profiles at once; missing ids are skipped
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Profile>>;

    /// Create a new profile. Fails with `ProfileAlreadyExists` on a duplicate external id.
    async fn create(&self, profile: &Profile) -> RepoResult<()>;

    /// Persist presence and last-seen changes
    async fn update(&self, profile: &Profile) -> RepoResult<()>;

    /// Profiles whose name contains `query`, case-insensitive
    async fn search(&self, query: &str, limit: i64) -> RepoResult<Vec<Profile>>;
}

// ============================================================================
// Container Repository
// ============================================================================

#[async_trait]
pub trait ContainerRepository: Send + Sync {
    /// Find any container by typed reference
    async fn find(&self, reference: ContainerRef) -> RepoResult<Option<Container>>;

    /// Find the conversation joining `a` and `b`, checking both orderings
    async fn find_conversation_between(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<Option<Conversation>>;

    /// Create a channel and join its owner
    async fn create_channel(&self, channel: &Channel) -> RepoResult<()>;

    /// Create a group and join its owner plus `member_ids`
    async fn create_group(&self, group: &Group, member_ids: &[Snowflake]) -> RepoResult<()>;

    /// Create a conversation. Fails with `ConversationExists` when the pair
    /// already has one, in either ordering.
    async fn create_conversation(&self, conversation: &Conversation) -> RepoResult<()>;

    /// Add a membership row. Returns false when it already existed.
    async fn add_member(&self, reference: ContainerRef, profile_id: Snowflake) -> RepoResult<bool>;

    /// Current member ids; the two participants for a conversation
    async fn member_ids(&self, reference: ContainerRef) -> RepoResult<Vec<Snowflake>>;

    /// Overwrite the denormalized lastMessage preview
    async fn update_last_message(
        &self,
        reference: ContainerRef,
        preview: Option<&str>,
    ) -> RepoResult<()>;

    /// Every container the profile belongs to
    async fn find_by_member(&self, profile_id: Snowflake) -> RepoResult<Vec<Container>>;

    /// Channels whose name contains `query`, case-insensitive
    async fn search_channels(&self, query: &str, limit: i64) -> RepoResult<Vec<Channel>>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Cursor pagination options for message queries
///
/// Pages are ordered newest first. `cursor` is the id of the last message of
/// the previous page; it is excluded from the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageQuery {
    pub cursor: Option<Snowflake>,
    pub limit: i64,
}

impl MessageQuery {
    pub fn new(cursor: Option<Snowflake>, limit: i64) -> Self {
        Self { cursor, limit }
    }
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Fetch several messages at once; missing ids are skipped
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Message>>;

    /// One page of a container's history, newest first. Fails with
    /// `InvalidCursor` when the cursor is not a message of this container.
    async fn find_page(&self, container: ContainerRef, query: MessageQuery)
        -> RepoResult<Vec<Message>>;

    /// Create a new message
    async fn create(&self, message: &Message) -> RepoResult<()>;

    /// Persist content, files, deleted flag and edit time
    async fn update(&self, message: &Message) -> RepoResult<()>;

    /// Record a read. Conversation messages flip their single flag, other
    /// kinds add to the reader set. Returns false when nothing changed.
    async fn add_reader(&self, message: &Message, reader_id: Snowflake) -> RepoResult<bool>;
}
