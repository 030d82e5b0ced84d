//! Services the hub consumes but does not implement.

use async_trait::async_trait;
use events::{ConversationId, UserId};
use serde_json::Value;
use std::fmt;

/// Participant lookup failed; the broadcast for that event is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    pub conversation_id: ConversationId,
    pub reason: String,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to resolve participants of conversation {}: {}",
            self.conversation_id, self.reason
        )
    }
}

impl std::error::Error for LookupError {}

/// Answers who must receive a broadcast for a conversation. Called once per
/// broadcast; results are not cached.
#[async_trait]
pub trait ParticipantResolver: Send + Sync {
    async fn participants_of(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<UserId>, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateMessageError {
    NotParticipant,
    InvalidInput(String),
    Internal(String),
}

impl fmt::Display for CreateMessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateMessageError::NotParticipant => {
                write!(f, "sender is not a participant of the conversation")
            }
            CreateMessageError::InvalidInput(reason) => write!(f, "invalid message: {reason}"),
            CreateMessageError::Internal(reason) => write!(f, "message creation failed: {reason}"),
        }
    }
}

impl std::error::Error for CreateMessageError {}

/// Persists a client-sent message.
///
/// On success the implementation is responsible for getting the message
/// broadcast, normally by publishing a domain event that reaches
/// [`HubEventHandler`](crate::HubEventHandler).
#[async_trait]
pub trait MessageCreator: Send + Sync {
    /// Returns the persisted message representation.
    async fn create(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: &str,
    ) -> Result<Value, CreateMessageError>;
}
