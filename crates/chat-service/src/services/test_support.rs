//! Shared fixtures for service tests

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use chat_common::{MessageConfig, StorageConfig};
use chat_core::traits::{EventPublisher, ProfileRepository};
use chat_core::{DomainEvent, Profile, SnowflakeGenerator};
use chat_db::MemoryStore;

use super::context::ServiceContext;

/// Publisher that keeps every event for later inspection
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: DomainEvent) {
        self.events.lock().push(event);
    }
}

pub struct Fixture {
    pub ctx: ServiceContext,
    pub store: MemoryStore,
    pub events: Arc<RecordingPublisher>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_batch_size(MessageConfig::default().batch_size)
    }

    pub fn with_batch_size(batch_size: u32) -> Self {
        let store = MemoryStore::new();
        let events = Arc::new(RecordingPublisher::default());
        let ctx = ServiceContext::with_store(store.clone())
            .publisher(events.clone())
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
            .message_config(MessageConfig {
                batch_size,
                ..MessageConfig::default()
            })
            .storage_config(StorageConfig {
                upload_dir: std::env::temp_dir()
                    .join(format!("chat-uploads-{}", uuid::Uuid::new_v4()))
                    .to_string_lossy()
                    .into_owned(),
                max_file_size_mb: 1,
            })
            .build()
            .unwrap();

        Self { ctx, store, events }
    }

    pub async fn profile(&self, name: &str) -> Profile {
        let id = self.ctx.generate_id();
        let profile = Profile::new(id, format!("ext-{id}"), name.to_string());
        ProfileRepository::create(&self.store, &profile).await.unwrap();
        profile
    }
}
