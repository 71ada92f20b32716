// src/application/service/mod.rs
// Application service interfaces

use async_trait::async_trait;

use crate::domain::event::DomainEvent;

/// Receives domain events after the aggregates that produced them have
/// been persisted. Implementations decide delivery (logging, queueing,
/// in-process fan-out); use cases only hand events over.
#[async_trait]
pub trait EventDispatcher {
    async fn dispatch(&self, event: DomainEvent);
}
