//! In-process stores backing the repository traits.

use crate::conversation::{Conversation, ConversationRepository};
use crate::error::{EntityErrorKind, Error};
use crate::message::{Message, MessageRepository, NewMessage};
use crate::{ConversationId, UserId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryConversations {
    conversations: RwLock<HashMap<ConversationId, Conversation>>,
}

impl InMemoryConversations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a conversation.
    pub async fn insert(&self, conversation: Conversation) {
        self.conversations
            .write()
            .await
            .insert(conversation.conversation_id, conversation);
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn conversation_not_found() -> Error {
    Error::entity(EntityErrorKind::NotFound, "conversation not found")
}

#[async_trait]
impl ConversationRepository for InMemoryConversations {
    async fn find_by_id(&self, conversation_id: ConversationId) -> Result<Conversation, Error> {
        self.conversations
            .read()
            .await
            .get(&conversation_id)
            .cloned()
            .ok_or_else(conversation_not_found)
    }

    async fn participant_ids(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<UserId>, Error> {
        let conversations = self.conversations.read().await;
        let conversation = conversations
            .get(&conversation_id)
            .ok_or_else(conversation_not_found)?;
        let mut participants = conversation.participants.clone();
        participants.sort_unstable();
        participants.dedup();
        Ok(participants)
    }

    async fn is_participant(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> Result<bool, Error> {
        Ok(self
            .conversations
            .read()
            .await
            .get(&conversation_id)
            .is_some_and(|c| c.participants.contains(&user_id)))
    }
}

/// Append-only message log. Ids start at 1 and increase monotonically.
pub struct InMemoryMessages {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessages {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryMessages {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessages {
    async fn create(&self, new_message: NewMessage) -> Result<Message, Error> {
        // Ids come from the log length under the write guard, so log order is id order.
        let mut messages = self.messages.write().await;
        let message = Message {
            message_id: messages.len() as i64 + 1,
            conversation_id: new_message.conversation_id,
            sender_id: new_message.sender_id,
            content: new_message.content,
            message_type: new_message.message_type,
            created_at: Utc::now(),
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn find_by_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, Error> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationType;
    use crate::message::MessageType;

    #[tokio::test]
    async fn test_participant_ids_are_unique() {
        let store = InMemoryConversations::new();
        let a = UserId::new_v4();
        let b = UserId::new_v4();
        let conversation_id = ConversationId::new_v4();
        store
            .insert(Conversation {
                conversation_id,
                conversation_type: ConversationType::Group,
                name: None,
                participants: vec![a, b, a],
            })
            .await;

        let participants = store.participant_ids(conversation_id).await.unwrap();
        assert_eq!(participants.len(), 2);
        assert!(participants.contains(&a));
        assert!(participants.contains(&b));
    }

    #[tokio::test]
    async fn test_participant_ids_of_unknown_conversation_is_not_found() {
        let store = InMemoryConversations::new();
        let err = store
            .participant_ids(ConversationId::new_v4())
            .await
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            crate::error::DomainErrorKind::Internal(crate::error::InternalErrorKind::Entity(
                EntityErrorKind::NotFound
            ))
        );
    }

    #[tokio::test]
    async fn test_message_ids_increase() {
        let store = InMemoryMessages::new();
        let conversation_id = ConversationId::new_v4();
        let new_message = || NewMessage {
            conversation_id,
            sender_id: UserId::new_v4(),
            content: "hi".to_string(),
            message_type: MessageType::Text,
        };

        let first = store.create(new_message()).await.unwrap();
        let second = store.create(new_message()).await.unwrap();

        assert_eq!(first.message_id, 1);
        assert_eq!(second.message_id, 2);
        assert_eq!(
            store
                .find_by_conversation(ConversationId::new_v4())
                .await
                .unwrap(),
            vec![]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_keep_log_in_id_order() {
        let store = std::sync::Arc::new(InMemoryMessages::new());
        let conversation_id = ConversationId::new_v4();

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create(NewMessage {
                            conversation_id,
                            sender_id: UserId::new_v4(),
                            content: format!("message {i}"),
                            message_type: MessageType::Text,
                        })
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let ids: Vec<i64> = store
            .find_by_conversation(conversation_id)
            .await
            .unwrap()
            .iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(ids, (1..=64).collect::<Vec<i64>>());
    }
}
