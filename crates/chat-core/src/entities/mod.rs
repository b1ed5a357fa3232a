//! Domain entities - core business objects

mod container;
mod message;
mod profile;

pub use container::{Channel, Container, ContainerKind, ContainerRef, Conversation, Group};
pub use message::{contains_link, FileKind, Message, MessageFiles, ReadState, TOMBSTONE};
pub use profile::Profile;
