//! # chat-core
//!
//! Domain layer containing entities, value objects, repository traits, and domain events.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    contains_link, Channel, Container, ContainerKind, ContainerRef, Conversation, FileKind, Group,
    Message, MessageFiles, Profile, ReadState, TOMBSTONE,
};
pub use error::DomainError;
pub use events::{ContainerCreatedEvent, DomainEvent, MessageEvent, MessageReadEvent};
pub use traits::{
    ContainerRepository, EventPublisher, MessageQuery, MessageRepository, NoopPublisher,
    ProfileRepository, RepoResult,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
