//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in chat-core.
//! Each repository handles database operations for a specific domain entity.

mod container;
mod error;
mod message;
mod profile;

pub use container::PgContainerRepository;
pub use message::PgMessageRepository;
pub use profile::PgProfileRepository;
