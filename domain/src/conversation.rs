use crate::error::{EntityErrorKind, Error};
use crate::{ConversationId, UserId};
use async_trait::async_trait;
use log::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    OneOnOne,
    Group,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: ConversationId,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub participants: Vec<UserId>,
}

/// Read access to conversations and their membership.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_id(&self, conversation_id: ConversationId) -> Result<Conversation, Error>;

    /// Every user entitled to see messages of the conversation.
    async fn participant_ids(&self, conversation_id: ConversationId)
        -> Result<Vec<UserId>, Error>;

    async fn is_participant(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> Result<bool, Error>;
}

/// Fails with `NotFound` for unknown conversations and `NotParticipant` when
/// `user_id` is not a member.
pub async fn ensure_participant(
    conversations: &dyn ConversationRepository,
    conversation_id: ConversationId,
    user_id: UserId,
) -> Result<(), Error> {
    let conversation = conversations.find_by_id(conversation_id).await?;

    if !conversations
        .is_participant(conversation.conversation_id, user_id)
        .await?
    {
        debug!("User {user_id} is not a participant of conversation {conversation_id}");
        return Err(Error::entity(
            EntityErrorKind::NotParticipant,
            "user is not a participant of this conversation",
        ));
    }

    Ok(())
}
