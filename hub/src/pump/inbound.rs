use super::{PumpExit, TransportError};
use crate::collaborators::{CreateMessageError, MessageCreator};
use crate::connection::Connection;
use crate::hub::Hub;
use crate::rate_limit::RateLimiter;
use crate::settings::ConnectionSettings;
use axum::extract::ws::Message;
use events::ConversationId;
use futures::{Stream, StreamExt};
use log::*;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};

const SEND_MESSAGE: &str = "send_message";

/// A client frame. Only `send_message` is acted on.
#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    conversation_id: String,
    #[serde(default)]
    content: String,
}

/// What happened to one inbound text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    Undecodable,
    Ignored,
    RateLimited,
    Invalid,
    Created,
    Rejected,
}

pub(crate) struct Dispatcher {
    connection: Arc<Connection>,
    creator: Arc<dyn MessageCreator>,
    limiter: RateLimiter,
}

impl Dispatcher {
    pub(crate) fn new(
        connection: Arc<Connection>,
        creator: Arc<dyn MessageCreator>,
        settings: &ConnectionSettings,
    ) -> Self {
        Self {
            connection,
            creator,
            limiter: RateLimiter::new(settings.rate_limit_count, settings.rate_limit_window),
        }
    }

    /// Decode, rate limit, validate and forward one frame. Nothing here is fatal
    /// to the connection and nothing is written back to the client.
    pub(crate) async fn dispatch(&mut self, text: &str) -> Dispatch {
        let frame: InboundFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(
                    "Discarding undecodable frame on connection {}: {e}",
                    self.connection.id()
                );
                return Dispatch::Undecodable;
            }
        };

        if frame.kind != SEND_MESSAGE {
            trace!("Ignoring frame of type {:?}", frame.kind);
            return Dispatch::Ignored;
        }

        if !self.limiter.try_acquire() {
            debug!(
                "Rate limit exceeded on connection {}, discarding send",
                self.connection.id()
            );
            return Dispatch::RateLimited;
        }

        let Ok(conversation_id) = frame.conversation_id.parse::<ConversationId>() else {
            debug!("Discarding send with malformed conversation id");
            return Dispatch::Invalid;
        };
        if frame.content.is_empty() {
            debug!("Discarding send with empty content");
            return Dispatch::Invalid;
        }

        match self
            .creator
            .create(conversation_id, self.connection.user_id(), &frame.content)
            .await
        {
            Ok(_) => Dispatch::Created,
            Err(e @ CreateMessageError::Internal(_)) => {
                warn!(
                    "Message from user {} to conversation {conversation_id} failed: {e}",
                    self.connection.user_id()
                );
                Dispatch::Rejected
            }
            Err(e) => {
                debug!(
                    "Message from user {} to conversation {conversation_id} rejected: {e}",
                    self.connection.user_id()
                );
                Dispatch::Rejected
            }
        }
    }
}

/// Read frames until the peer goes away, a read fails, the keep-alive
/// timeout elapses or the connection is unregistered. Always leaves the
/// connection unregistered.
pub async fn run_inbound<S, E>(
    mut stream: S,
    connection: Arc<Connection>,
    hub: Arc<Hub>,
    creator: Arc<dyn MessageCreator>,
    settings: ConnectionSettings,
) -> PumpExit
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: fmt::Display,
{
    let mut dispatcher = Dispatcher::new(connection.clone(), creator, &settings);
    let mut pong_deadline = Instant::now() + settings.pong_wait;

    let exit = loop {
        let next = tokio::select! {
            _ = connection.closed() => break PumpExit::Unregistered,
            next = timeout_at(pong_deadline, stream.next()) => next,
        };

        let frame = match next {
            Err(_) => break PumpExit::Failed(TransportError::TimedOut),
            Ok(None) => break PumpExit::StreamEnded,
            Ok(Some(Err(e))) => break PumpExit::Failed(TransportError::Read(e.to_string())),
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => {
                dispatcher.dispatch(text.as_str()).await;
            }
            Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    dispatcher.dispatch(text).await;
                }
                Err(_) => debug!(
                    "Discarding non UTF-8 binary frame on connection {}",
                    connection.id()
                ),
            },
            // Only a pong answers our probe; other traffic leaves the deadline alone.
            Message::Pong(_) => pong_deadline = Instant::now() + settings.pong_wait,
            Message::Ping(_) => {}
            Message::Close(_) => break PumpExit::ClosedByPeer,
        }
    };

    hub.unregister(&connection);
    exit
}

#[cfg(test)]
#[path = "inbound_tests.rs"]
mod inbound_tests;
