use crate::Hub;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by broadcasting them to the connected participants.
///
/// The hub resolves recipients itself, so events only need to name the
/// conversation they belong to.
pub struct HubEventHandler {
    hub: Arc<Hub>,
}

impl HubEventHandler {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl EventHandler for HubEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::MessageCreated {
                conversation_id,
                message,
            } => {
                debug!(
                    "Handling MessageCreated event for conversation {}",
                    conversation_id
                );

                let outcome = self.hub.broadcast(*conversation_id, message.clone()).await;
                debug!(
                    "Delivered message to {}/{} connection(s) of conversation {}",
                    outcome.delivered, outcome.recipients, conversation_id
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{LookupError, ParticipantResolver};
    use crate::Connection;
    use events::{ConversationId, EventPublisher, UserId};
    use serde_json::json;

    struct Pair(UserId, UserId);

    #[async_trait]
    impl ParticipantResolver for Pair {
        async fn participants_of(
            &self,
            _conversation_id: ConversationId,
        ) -> Result<Vec<UserId>, LookupError> {
            Ok(vec![self.0, self.1])
        }
    }

    #[tokio::test]
    async fn test_message_created_event_reaches_participants() {
        let (alice, bob) = (UserId::new_v4(), UserId::new_v4());
        let hub = Arc::new(Hub::new(Arc::new(Pair(alice, bob))));
        let (alice_conn, mut alice_queue) = Connection::new(alice, 8);
        let (bob_conn, mut bob_queue) = Connection::new(bob, 8);
        hub.register(&alice_conn);
        hub.register(&bob_conn);

        let publisher = EventPublisher::new().with_handler(Arc::new(HubEventHandler::new(hub)));
        publisher
            .publish(DomainEvent::MessageCreated {
                conversation_id: ConversationId::new_v4(),
                message: json!({"content": "hi"}),
            })
            .await;

        assert_eq!(alice_queue.try_recv().unwrap().message()["content"], "hi");
        assert_eq!(bob_queue.try_recv().unwrap().message()["content"], "hi");
    }
}
