//! Event publisher port - the fan-out side of every write

use async_trait::async_trait;
use std::sync::Arc;

use crate::events::DomainEvent;

/// Receives domain events after the originating write has been persisted
///
/// Publishing is best-effort: implementations log delivery failures and never
/// report them back to the writer.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent);
}

#[async_trait]
impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    async fn publish(&self, event: DomainEvent) {
        (**self).publish(event).await;
    }
}

/// Publisher that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _event: DomainEvent) {}
}
