//! Event system infrastructure for the chat backend.
//!
//! Persistence-side code publishes a [`DomainEvent`] once a change is durable;
//! infrastructure such as the realtime hub subscribes through [`EventHandler`].
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing all business events in the system
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates, so both `domain` and `hub`
//! can depend on it. Entity data is carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any entity's id field data type.
pub type Id = Uuid;

/// Identity of an authenticated principal.
pub type UserId = Id;

/// Identity of a conversation. Only ever used as a lookup key.
pub type ConversationId = Id;

/// Domain events that represent business-level changes in the system.
/// These events are emitted after the change has been persisted.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// Emitted when a message has been stored in a conversation.
    MessageCreated {
        /// Conversation the message belongs to. Recipients are resolved from it.
        conversation_id: ConversationId,
        /// Complete serialized message as persisted.
        message: Value,
    },
}

/// Trait for handling domain events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, ConversationId)>>,
        label: &'static str,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &DomainEvent) {
            let DomainEvent::MessageCreated {
                conversation_id, ..
            } = event;
            self.seen
                .lock()
                .unwrap()
                .push((self.label.to_string(), *conversation_id));
        }
    }

    #[tokio::test]
    async fn test_publish_without_handlers_is_a_no_op() {
        let publisher = EventPublisher::new();
        publisher
            .publish(DomainEvent::MessageCreated {
                conversation_id: Id::new_v4(),
                message: serde_json::json!({}),
            })
            .await;
        assert_eq!(publisher.handler_count(), 0);
    }

    #[tokio::test]
    async fn test_publish_reaches_every_handler_in_registration_order() {
        let first = Arc::new(Recorder {
            label: "first",
            ..Default::default()
        });
        let second = Arc::new(Recorder {
            label: "second",
            ..Default::default()
        });
        let publisher = EventPublisher::new()
            .with_handler(first.clone())
            .with_handler(second.clone());

        let conversation_id = Id::new_v4();
        publisher
            .publish(DomainEvent::MessageCreated {
                conversation_id,
                message: serde_json::json!({"content": "hi"}),
            })
            .await;

        assert_eq!(publisher.handler_count(), 2);
        assert_eq!(
            first.seen.lock().unwrap().as_slice(),
            &[("first".to_string(), conversation_id)]
        );
        assert_eq!(
            second.seen.lock().unwrap().as_slice(),
            &[("second".to_string(), conversation_id)]
        );
    }

    #[test]
    fn test_with_handler_leaves_original_publisher_untouched() {
        let base = EventPublisher::new();
        let extended = base.clone().with_handler(Arc::new(Recorder::default()));
        assert_eq!(base.handler_count(), 0);
        assert_eq!(extended.handler_count(), 1);
    }
}
