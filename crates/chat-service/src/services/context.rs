//! Service context - dependency container for services
//!
//! Holds the repositories, the event publisher and the settings services read.

use std::sync::Arc;

use chat_common::{MessageConfig, StorageConfig};
use chat_core::traits::{ContainerRepository, EventPublisher, MessageRepository, ProfileRepository};
use chat_core::{DomainEvent, Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// Cloning is cheap; every clone shares the same repositories and publisher.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    profile_repo: Arc<dyn ProfileRepository>,
    container_repo: Arc<dyn ContainerRepository>,
    message_repo: Arc<dyn MessageRepository>,

    // Fan-out
    publisher: Arc<dyn EventPublisher>,

    snowflake_generator: Arc<SnowflakeGenerator>,

    // Settings
    messages: MessageConfig,
    storage: StorageConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        profile_repo: Arc<dyn ProfileRepository>,
        container_repo: Arc<dyn ContainerRepository>,
        message_repo: Arc<dyn MessageRepository>,
        publisher: Arc<dyn EventPublisher>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        messages: MessageConfig,
        storage: StorageConfig,
    ) -> Self {
        Self {
            profile_repo,
            container_repo,
            message_repo,
            publisher,
            snowflake_generator,
            messages,
            storage,
        }
    }

    /// Start a builder whose three repositories all come from `store`
    pub fn with_store<S>(store: S) -> ServiceContextBuilder
    where
        S: ProfileRepository + ContainerRepository + MessageRepository + Clone + 'static,
    {
        ServiceContextBuilder::new()
            .profile_repo(Arc::new(store.clone()))
            .container_repo(Arc::new(store.clone()))
            .message_repo(Arc::new(store))
    }

    // === Repositories ===

    /// Get the profile repository
    pub fn profile_repo(&self) -> &dyn ProfileRepository {
        self.profile_repo.as_ref()
    }

    /// Get the container repository
    pub fn container_repo(&self) -> &dyn ContainerRepository {
        self.container_repo.as_ref()
    }

    /// Get the message repository
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    // === Fan-out ===

    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    /// Hand an event to the publisher. Delivery is best-effort and never fails the caller.
    pub async fn publish(&self, event: DomainEvent) {
        self.publisher.publish(event).await;
    }

    // === Settings ===

    pub fn message_config(&self) -> &MessageConfig {
        &self.messages
    }

    pub fn storage_config(&self) -> &StorageConfig {
        &self.storage
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("publisher", &"dyn EventPublisher")
            .field("messages", &self.messages)
            .field("storage", &self.storage)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    profile_repo: Option<Arc<dyn ProfileRepository>>,
    container_repo: Option<Arc<dyn ContainerRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    messages: MessageConfig,
    storage: Option<StorageConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            profile_repo: None,
            container_repo: None,
            message_repo: None,
            publisher: None,
            snowflake_generator: None,
            messages: MessageConfig::default(),
            storage: None,
        }
    }

    pub fn profile_repo(mut self, repo: Arc<dyn ProfileRepository>) -> Self {
        self.profile_repo = Some(repo);
        self
    }

    pub fn container_repo(mut self, repo: Arc<dyn ContainerRepository>) -> Self {
        self.container_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn message_config(mut self, config: MessageConfig) -> Self {
        self.messages = config;
        self
    }

    pub fn storage_config(mut self, config: StorageConfig) -> Self {
        self.storage = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// The message settings fall back to their defaults; everything else is required.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.profile_repo
                .ok_or_else(|| ServiceError::validation("profile_repo is required"))?,
            self.container_repo
                .ok_or_else(|| ServiceError::validation("container_repo is required"))?,
            self.message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            self.publisher
                .ok_or_else(|| ServiceError::validation("publisher is required"))?,
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
            self.messages,
            self.storage
                .ok_or_else(|| ServiceError::validation("storage_config is required"))?,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
