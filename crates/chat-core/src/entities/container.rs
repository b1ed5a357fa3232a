//! Container entities - the messaging scopes a message can belong to
//!
//! A container is a Channel (owner broadcasts, members read), a Group (every
//! member may post) or a Conversation (exactly two participants). The
//! [`Container`] enum is the adapter the message layer works against so the
//! send/edit/read logic is written once for all three.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Which kind of container a message lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Channel,
    Group,
    Conversation,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [Self::Channel, Self::Group, Self::Conversation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Group => "group",
            Self::Conversation => "conversation",
        }
    }

    /// Conversations track a single read flag, the other kinds a reader set
    #[inline]
    pub fn tracks_single_reader(&self) -> bool {
        matches!(self, Self::Conversation)
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "channel" | "channels" => Ok(Self::Channel),
            "group" | "groups" => Ok(Self::Group),
            "conversation" | "conversations" => Ok(Self::Conversation),
            other => Err(DomainError::Validation(format!(
                "unknown container type: {other}"
            ))),
        }
    }
}

/// Typed pointer to a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    pub kind: ContainerKind,
    pub id: Snowflake,
}

impl ContainerRef {
    pub const fn new(kind: ContainerKind, id: Snowflake) -> Self {
        Self { kind, id }
    }

    pub const fn channel(id: Snowflake) -> Self {
        Self::new(ContainerKind::Channel, id)
    }

    pub const fn group(id: Snowflake) -> Self {
        Self::new(ContainerKind::Group, id)
    }

    pub const fn conversation(id: Snowflake) -> Self {
        Self::new(ContainerKind::Conversation, id)
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Broadcast channel: only the owner posts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub owner_id: Snowflake,
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Channel {
    pub fn new(id: Snowflake, name: String, owner_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description: None,
            image: None,
            owner_id,
            last_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Group chat: every member posts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub owner_id: Snowflake,
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(id: Snowflake, name: String, owner_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description: None,
            image: None,
            owner_id,
            last_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Pairwise conversation
///
/// At most one conversation exists per unordered pair of members; callers
/// must look up both orderings before creating one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: Snowflake,
    pub member_one_id: Snowflake,
    pub member_two_id: Snowflake,
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: Snowflake, member_one_id: Snowflake, member_two_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            member_one_id,
            member_two_id,
            last_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn involves(&self, profile_id: Snowflake) -> bool {
        self.member_one_id == profile_id || self.member_two_id == profile_id
    }

    /// True when this conversation joins `a` and `b`, in either order
    pub fn is_between(&self, a: Snowflake, b: Snowflake) -> bool {
        (self.member_one_id == a && self.member_two_id == b)
            || (self.member_one_id == b && self.member_two_id == a)
    }

    /// The participant that is not `profile_id`
    pub fn other_member(&self, profile_id: Snowflake) -> Option<Snowflake> {
        if self.member_one_id == profile_id {
            Some(self.member_two_id)
        } else if self.member_two_id == profile_id {
            Some(self.member_one_id)
        } else {
            None
        }
    }

    pub fn member_ids(&self) -> Vec<Snowflake> {
        vec![self.member_one_id, self.member_two_id]
    }
}

/// Any of the three container kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Channel(Channel),
    Group(Group),
    Conversation(Conversation),
}

impl Container {
    pub fn reference(&self) -> ContainerRef {
        match self {
            Self::Channel(c) => ContainerRef::channel(c.id),
            Self::Group(g) => ContainerRef::group(g.id),
            Self::Conversation(c) => ContainerRef::conversation(c.id),
        }
    }

    #[inline]
    pub fn kind(&self) -> ContainerKind {
        self.reference().kind
    }

    #[inline]
    pub fn id(&self) -> Snowflake {
        self.reference().id
    }

    /// Owner, if the kind has one (conversations do not)
    pub fn owner_id(&self) -> Option<Snowflake> {
        match self {
            Self::Channel(c) => Some(c.owner_id),
            Self::Group(g) => Some(g.owner_id),
            Self::Conversation(_) => None,
        }
    }

    pub fn last_message(&self) -> Option<&str> {
        match self {
            Self::Channel(c) => c.last_message.as_deref(),
            Self::Group(g) => g.last_message.as_deref(),
            Self::Conversation(c) => c.last_message.as_deref(),
        }
    }

    pub fn set_last_message(&mut self, preview: Option<String>) {
        let now = Utc::now();
        match self {
            Self::Channel(c) => {
                c.last_message = preview;
                c.updated_at = now;
            }
            Self::Group(g) => {
                g.last_message = preview;
                g.updated_at = now;
            }
            Self::Conversation(c) => {
                c.last_message = preview;
                c.updated_at = now;
            }
        }
    }

    /// Posting rule per kind
    ///
    /// Channels accept posts from their owner only. Groups accept posts from
    /// any member and conversations from either participant. `member_ids` is
    /// the container's current membership list.
    pub fn can_post(&self, profile_id: Snowflake, member_ids: &[Snowflake]) -> bool {
        match self {
            Self::Channel(c) => c.owner_id == profile_id,
            Self::Group(_) => member_ids.contains(&profile_id),
            Self::Conversation(c) => c.involves(profile_id),
        }
    }
}
