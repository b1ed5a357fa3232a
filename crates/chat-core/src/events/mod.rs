mod domain_event;

pub use domain_event::{ContainerCreatedEvent, DomainEvent, MessageEvent, MessageReadEvent};
