//! Database models - SQLx-compatible structs for PostgreSQL tables

mod container;
mod message;
mod profile;

pub use container::{ConversationModel, RoomModel};
pub use message::MessageModel;
pub use profile::ProfileModel;
