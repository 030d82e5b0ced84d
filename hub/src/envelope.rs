use axum::extract::ws::Utf8Bytes;
use events::ConversationId;
use serde::Serialize;
use serde_json::Value;

/// Kinds of envelope the server pushes to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    NewMessage,
}

#[derive(Serialize)]
struct WireEnvelope<'a> {
    #[serde(rename = "type")]
    kind: EnvelopeKind,
    message: &'a Value,
}

/// An immutable outbound event, serialized once and shared by every recipient.
#[derive(Debug)]
pub struct Envelope {
    kind: EnvelopeKind,
    conversation_id: ConversationId,
    message: Value,
    payload: Utf8Bytes,
}

impl Envelope {
    /// Wire form: `{"type":"new_message","message":<persisted message>}`.
    pub fn new_message(
        conversation_id: ConversationId,
        message: Value,
    ) -> Result<Self, serde_json::Error> {
        let kind = EnvelopeKind::NewMessage;
        let payload = serde_json::to_string(&WireEnvelope {
            kind,
            message: &message,
        })?;

        Ok(Self {
            kind,
            conversation_id,
            message,
            payload: payload.into(),
        })
    }

    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn message(&self) -> &Value {
        &self.message
    }

    /// Serialized text frame; cloning it does not copy the bytes.
    pub fn payload(&self) -> &Utf8Bytes {
        &self.payload
    }
}
