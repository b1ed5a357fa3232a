//! Fan-out dispatcher
//!
//! Recipients are resolved by the service that emits an event; this side
//! only maps an event to routing keys and hands each payload to the
//! connections registered under the recipient. Connections that never
//! registered are invisible here.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chat_core::entities::ContainerRef;
use chat_core::events::DomainEvent;
use chat_core::traits::EventPublisher;
use chat_core::Snowflake;
use serde_json::json;

use crate::connection::ConnectionRegistry;
use crate::protocol::ServerEvent;

/// One payload bound for one profile
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub recipient: Snowflake,
    pub message: ServerEvent,
}

/// Publisher that pushes events to live sockets
pub struct FanoutDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl FanoutDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Every payload an event produces, in recipient order
    pub fn route(event: &DomainEvent) -> Vec<Delivery> {
        let event_type = event.event_type();
        let mut deliveries = Vec::new();

        match event {
            DomainEvent::MessageCreated(e) => {
                let key = messages_key(e.container);
                let notice = json!({
                    "containerType": e.container.kind,
                    "containerId": e.container.id,
                    "lastMessage": e.last_message,
                    "message": e.message,
                });
                for recipient in unique(&e.recipients) {
                    deliveries.push(Delivery {
                        recipient,
                        message: ServerEvent::new(key.clone(), event_type, e.message.clone()),
                    });
                    deliveries.push(Delivery {
                        recipient,
                        message: ServerEvent::new(
                            format!("user:{recipient}:lastMessageUpdate"),
                            event_type,
                            notice.clone(),
                        ),
                    });
                }
            }
            DomainEvent::MessageUpdated(e) => {
                let key = format!("{}:update", messages_key(e.container));
                for recipient in unique(&e.recipients) {
                    deliveries.push(Delivery {
                        recipient,
                        message: ServerEvent::new(key.clone(), event_type, e.message.clone()),
                    });
                }
            }
            DomainEvent::MessageRead(e) => {
                let key = format!("message:{}:read", e.message_id);
                let data = json!({
                    "messageId": e.message_id,
                    "readerId": e.reader_id,
                    "containerType": e.container.kind,
                    "containerId": e.container.id,
                });
                for recipient in unique(&e.recipients) {
                    deliveries.push(Delivery {
                        recipient,
                        message: ServerEvent::new(key.clone(), event_type, data.clone()),
                    });
                }
            }
            DomainEvent::ContainerCreated(e) => {
                for recipient in unique(&e.recipients) {
                    deliveries.push(Delivery {
                        recipient,
                        message: ServerEvent::new(
                            format!("user:{recipient}:{}Created", e.container.kind),
                            event_type,
                            e.data.clone(),
                        ),
                    });
                }
            }
        }

        deliveries
    }

    /// Route an event and queue each payload; returns how many were queued
    pub fn dispatch(&self, event: &DomainEvent) -> usize {
        let deliveries = Self::route(event);
        let planned = deliveries.len();

        let sent: usize = deliveries
            .iter()
            .map(|d| self.registry.send_to_identity(d.recipient, &d.message))
            .sum();

        tracing::debug!(
            event = event.event_type(),
            container = %event.container(),
            planned,
            sent,
            "Event dispatched"
        );

        sent
    }
}

#[async_trait]
impl EventPublisher for FanoutDispatcher {
    async fn publish(&self, event: DomainEvent) {
        self.dispatch(&event);
    }
}

impl std::fmt::Debug for FanoutDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutDispatcher")
            .field("registry", &self.registry)
            .finish()
    }
}

/// `<kind>:<id>:messages`
fn messages_key(container: ContainerRef) -> String {
    format!("{container}:messages")
}

/// Recipients in order, first occurrence wins
fn unique(recipients: &[Snowflake]) -> impl Iterator<Item = Snowflake> + '_ {
    let mut seen = HashSet::new();
    recipients.iter().copied().filter(move |id| seen.insert(*id))
}
