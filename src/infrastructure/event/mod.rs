// src/infrastructure/event/mod.rs
// Event dispatcher implementations.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::service::EventDispatcher;
use crate::domain::event::DomainEvent;

/// Reports every dispatched event through the logger.
#[derive(Default)]
pub struct LogEventDispatcher;

impl LogEventDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventDispatcher for LogEventDispatcher {
    async fn dispatch(&self, event: DomainEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => log::info!("Domain event: {}", payload),
            Err(e) => log::error!("Failed to serialize domain event: {}", e),
        }
    }
}

/// Captures dispatched events for inspection. Used by tests and the demo.
#[derive(Default)]
pub struct RecordingEventDispatcher {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recorded(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventDispatcher for RecordingEventDispatcher {
    async fn dispatch(&self, event: DomainEvent) {
        self.events.lock().await.push(event);
    }
}
