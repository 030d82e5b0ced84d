//! Domain services exposed through the traits the hub consumes.

use async_trait::async_trait;
use domain::conversation::ConversationRepository;
use domain::error::{DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind};
use domain::message::MessageService;
use domain::{ConversationId, UserId};
use hub::{CreateMessageError, LookupError, MessageCreator, ParticipantResolver};
use std::error::Error as _;
use std::sync::Arc;

pub struct ConversationParticipants {
    conversations: Arc<dyn ConversationRepository>,
}

impl ConversationParticipants {
    pub fn new(conversations: Arc<dyn ConversationRepository>) -> Self {
        Self { conversations }
    }
}

#[async_trait]
impl ParticipantResolver for ConversationParticipants {
    async fn participants_of(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<UserId>, LookupError> {
        self.conversations
            .participant_ids(conversation_id)
            .await
            .map_err(|e| LookupError {
                conversation_id,
                reason: e.to_string(),
            })
    }
}

pub struct MessageServiceCreator {
    service: MessageService,
}

impl MessageServiceCreator {
    pub fn new(service: MessageService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MessageCreator for MessageServiceCreator {
    async fn create(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: &str,
    ) -> Result<serde_json::Value, CreateMessageError> {
        let message = self
            .service
            .create(conversation_id, sender_id, content)
            .await
            .map_err(create_error)?;
        serde_json::to_value(&message).map_err(|e| CreateMessageError::Internal(e.to_string()))
    }
}

fn create_error(err: DomainError) -> CreateMessageError {
    let reason = err
        .source()
        .map(|source| source.to_string())
        .unwrap_or_else(|| format!("{:?}", err.error_kind));

    match err.error_kind {
        DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotParticipant)) => {
            CreateMessageError::NotParticipant
        }
        DomainErrorKind::Internal(InternalErrorKind::Entity(
            EntityErrorKind::Invalid | EntityErrorKind::NotFound,
        )) => CreateMessageError::InvalidInput(reason),
        _ => CreateMessageError::Internal(reason),
    }
}
