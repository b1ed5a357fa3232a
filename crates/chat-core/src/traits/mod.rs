mod publisher;
mod repositories;

pub use publisher::{EventPublisher, NoopPublisher};
pub use repositories::{
    ContainerRepository, MessageQuery, MessageRepository, ProfileRepository, RepoResult,
};
