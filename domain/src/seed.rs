//! Loads conversations into the in-memory store from a JSON file.
//!
//! ```json
//! {
//!   "conversations": [
//!     {
//!       "conversation_id": "5f0c…",
//!       "type": "group",
//!       "name": "Team",
//!       "participants": ["9a1e…", "c44b…"]
//!     }
//!   ]
//! }
//! ```

use crate::conversation::Conversation;
use crate::error::Error;
use crate::memory::InMemoryConversations;
use log::*;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

impl SeedData {
    pub async fn from_file(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Insert every conversation, returning how many were loaded.
    pub async fn apply(self, store: &InMemoryConversations) -> usize {
        let count = self.conversations.len();
        for conversation in self.conversations {
            debug!(
                "Seeding conversation {} with {} participants",
                conversation.conversation_id,
                conversation.participants.len()
            );
            store.insert(conversation).await;
        }
        count
    }
}

pub async fn load_file(path: &Path, store: &InMemoryConversations) -> Result<usize, Error> {
    let count = SeedData::from_file(path).await?.apply(store).await;
    info!("Loaded {count} conversations from {}", path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationRepository;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::{ConversationId, UserId};
    use std::io::Write;

    #[tokio::test]
    async fn test_load_file_populates_store() {
        let conversation_id = ConversationId::new_v4();
        let alice = UserId::new_v4();
        let bob = UserId::new_v4();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"conversations":[{{"conversation_id":"{conversation_id}","type":"one_on_one","participants":["{alice}","{bob}"]}}]}}"#
        )
        .unwrap();

        let store = InMemoryConversations::new();
        assert_eq!(load_file(file.path(), &store).await.unwrap(), 1);
        assert!(store.is_participant(conversation_id, alice).await.unwrap());
        assert!(store.is_participant(conversation_id, bob).await.unwrap());
    }

    #[tokio::test]
    async fn test_load_file_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = load_file(file.path(), &InMemoryConversations::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_load_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_file(&dir.path().join("absent.json"), &InMemoryConversations::new()).await;
        assert!(result.is_err());
    }
}
