use crate::conversation::{self, ConversationRepository};
use crate::error::{EntityErrorKind, Error};
use crate::{ConversationId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use events::{DomainEvent, EventPublisher};
use log::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Longest message accepted, counted in characters after trimming.
pub const MAX_MESSAGE_CONTENT_LENGTH: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
}

/// A message as persisted and as delivered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
}

/// A validated message that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub message_type: MessageType,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist the message, assigning its id and creation time.
    async fn create(&self, new_message: NewMessage) -> Result<Message, Error>;

    /// Messages of a conversation, oldest first.
    async fn find_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, Error>;
}

/// Validates, persists and announces new messages.
///
/// Announcing goes through the [`EventPublisher`]; the realtime hub subscribes to
/// it, so a successful `create` is what triggers delivery to every participant.
#[derive(Clone)]
pub struct MessageService {
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
    publisher: EventPublisher,
}

impl MessageService {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            conversations,
            messages,
            publisher,
        }
    }

    pub async fn create(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: &str,
    ) -> Result<Message, Error> {
        conversation::ensure_participant(self.conversations.as_ref(), conversation_id, sender_id)
            .await?;

        let content = trim_content(content);
        if content.is_empty() {
            return Err(Error::entity(
                EntityErrorKind::Invalid,
                "message content required",
            ));
        }
        if content.chars().count() > MAX_MESSAGE_CONTENT_LENGTH {
            return Err(Error::entity(EntityErrorKind::Invalid, "message too long"));
        }

        let message = self
            .messages
            .create(NewMessage {
                conversation_id,
                sender_id,
                content: content.to_string(),
                message_type: MessageType::Text,
            })
            .await?;

        debug!(
            "Stored message {} in conversation {}",
            message.message_id, conversation_id
        );

        match serde_json::to_value(&message) {
            Ok(value) => {
                self.publisher
                    .publish(DomainEvent::MessageCreated {
                        conversation_id,
                        message: value,
                    })
                    .await
            }
            // The message is stored; only the realtime notification is lost.
            Err(e) => error!("Failed to serialize message {}: {e}", message.message_id),
        }

        Ok(message)
    }
}

/// Strips leading and trailing ASCII spaces, tabs and line breaks. Other
/// whitespace is part of the content.
fn trim_content(content: &str) -> &str {
    content.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Conversation, ConversationType};
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::memory::{InMemoryConversations, InMemoryMessages};
    use events::EventHandler;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CapturingHandler {
        events: Mutex<Vec<(ConversationId, serde_json::Value)>>,
    }

    #[async_trait]
    impl EventHandler for CapturingHandler {
        async fn handle(&self, event: &DomainEvent) {
            let DomainEvent::MessageCreated {
                conversation_id,
                message,
            } = event;
            self.events
                .lock()
                .unwrap()
                .push((*conversation_id, message.clone()));
        }
    }

    struct Fixture {
        service: MessageService,
        messages: Arc<InMemoryMessages>,
        handler: Arc<CapturingHandler>,
        conversation_id: ConversationId,
        member: UserId,
    }

    async fn fixture() -> Fixture {
        let conversations = Arc::new(InMemoryConversations::new());
        let messages = Arc::new(InMemoryMessages::new());
        let handler = Arc::new(CapturingHandler::default());
        let conversation_id = ConversationId::new_v4();
        let member = UserId::new_v4();
        conversations
            .insert(Conversation {
                conversation_id,
                conversation_type: ConversationType::OneOnOne,
                name: None,
                participants: vec![member, UserId::new_v4()],
            })
            .await;

        let service = MessageService::new(
            conversations,
            messages.clone(),
            EventPublisher::new().with_handler(handler.clone()),
        );
        Fixture {
            service,
            messages,
            handler,
            conversation_id,
            member,
        }
    }

    fn entity_kind(err: Error) -> EntityErrorKind {
        match err.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Entity(kind)) => kind,
            other => panic!("expected entity error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_persists_trimmed_content_and_publishes_event() {
        let f = fixture().await;

        let message = f
            .service
            .create(f.conversation_id, f.member, "  hi there\r\n")
            .await
            .unwrap();

        assert_eq!(message.content, "hi there");
        assert_eq!(message.message_type, MessageType::Text);
        assert_eq!(
            f.messages
                .find_by_conversation(f.conversation_id)
                .await
                .unwrap(),
            vec![message.clone()]
        );

        let events = f.handler.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, f.conversation_id);
        assert_eq!(events[0].1["content"], "hi there");
        assert_eq!(events[0].1["type"], "text");
        assert_eq!(events[0].1["sender_id"], f.member.to_string());
    }

    #[tokio::test]
    async fn test_create_rejects_whitespace_only_content() {
        let f = fixture().await;
        let err = f
            .service
            .create(f.conversation_id, f.member, " \t\n ")
            .await
            .unwrap_err();
        assert_eq!(entity_kind(err), EntityErrorKind::Invalid);
        assert!(f.handler.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_overlong_content() {
        let f = fixture().await;
        let content = "a".repeat(MAX_MESSAGE_CONTENT_LENGTH + 1);
        let err = f
            .service
            .create(f.conversation_id, f.member, &content)
            .await
            .unwrap_err();
        assert_eq!(entity_kind(err), EntityErrorKind::Invalid);
    }

    #[tokio::test]
    async fn test_create_accepts_content_at_the_limit_in_characters() {
        let f = fixture().await;
        // Multi-byte characters count once each.
        let content = "é".repeat(MAX_MESSAGE_CONTENT_LENGTH);
        assert!(f
            .service
            .create(f.conversation_id, f.member, &content)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_non_participant() {
        let f = fixture().await;
        let err = f
            .service
            .create(f.conversation_id, UserId::new_v4(), "hello")
            .await
            .unwrap_err();
        assert_eq!(entity_kind(err), EntityErrorKind::NotParticipant);
        assert!(f.handler.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_trim_content_keeps_inner_and_non_ascii_whitespace() {
        assert_eq!(trim_content("\t a  b \n"), "a  b");
        assert_eq!(trim_content("\u{00a0}x\u{00a0}"), "\u{00a0}x\u{00a0}");
    }
}
