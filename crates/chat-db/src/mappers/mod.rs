//! Entity to model mappers
//!
//! This module provides conversions between domain entities (chat-core) and database models.
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod container;
mod message;
mod profile;

pub use container::RoomInsert;
pub use message::{messages_from_models, MessageInsert};
