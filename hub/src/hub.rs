use crate::collaborators::ParticipantResolver;
use crate::connection::{Connection, EnqueueError};
use crate::envelope::Envelope;
use crate::registry::ConnectionRegistry;
use events::{ConversationId, UserId};
use log::*;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Per-connection results of one broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Open connections the envelope was offered to.
    pub recipients: usize,
    pub delivered: usize,
    /// Deliveries lost to a full queue or a connection closing mid-broadcast.
    pub dropped: usize,
}

/// Process-wide registry of open connections plus the fan-out path.
///
/// Constructed once at startup and shared by reference with every session and
/// with the domain event handler.
pub struct Hub {
    registry: ConnectionRegistry,
    resolver: Arc<dyn ParticipantResolver>,
}

impl Hub {
    pub fn new(resolver: Arc<dyn ParticipantResolver>) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            resolver,
        }
    }

    /// Make the connection eligible for broadcasts. Registering twice is a no-op.
    pub fn register(&self, connection: &Arc<Connection>) {
        if connection.is_closed() {
            debug!(
                "Ignoring registration of closed connection {}",
                connection.id()
            );
            return;
        }

        if self.registry.insert(connection) {
            info!(
                "Registered connection {} for user {}",
                connection.id(),
                connection.user_id()
            );
        }
    }

    /// Remove the connection and raise its closed signal so both pumps wake
    /// and exit. Safe to call any number of times.
    pub fn unregister(&self, connection: &Connection) {
        let removed = self.registry.remove(connection);
        connection.close();

        if removed {
            info!(
                "Unregistered connection {} for user {} ({} deliveries dropped)",
                connection.id(),
                connection.user_id(),
                connection.dropped_count()
            );
        }
    }

    pub fn is_registered(&self, connection: &Connection) -> bool {
        self.registry.contains(connection)
    }

    /// Resolve the conversation's participants and push one `new_message`
    /// envelope to each of their open connections.
    ///
    /// Failures to resolve or serialize drop the whole broadcast; the message
    /// itself is already persisted.
    pub async fn broadcast(
        &self,
        conversation_id: ConversationId,
        message: Value,
    ) -> BroadcastOutcome {
        let participants = match self.resolver.participants_of(conversation_id).await {
            Ok(participants) => participants,
            Err(e) => {
                warn!("Dropping broadcast: {e}");
                return BroadcastOutcome::default();
            }
        };

        let envelope = match Envelope::new_message(conversation_id, message) {
            Ok(envelope) => Arc::new(envelope),
            Err(e) => {
                error!("Dropping broadcast for conversation {conversation_id}: {e}");
                return BroadcastOutcome::default();
            }
        };

        self.fan_out(&participants, envelope)
    }

    /// Offer `envelope` to every open connection of `participants` without
    /// blocking. Users without connections are skipped.
    pub fn fan_out(&self, participants: &[UserId], envelope: Arc<Envelope>) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();
        let mut seen = HashSet::with_capacity(participants.len());

        for user_id in participants {
            if !seen.insert(*user_id) {
                continue;
            }

            for connection in self.registry.connections_of(user_id) {
                outcome.recipients += 1;
                match connection.try_enqueue(envelope.clone()) {
                    Ok(()) => outcome.delivered += 1,
                    Err(EnqueueError::Full) => {
                        outcome.dropped += 1;
                        warn!(
                            "Outbound queue full for connection {} of user {}, dropping message",
                            connection.id(),
                            user_id
                        );
                    }
                    Err(EnqueueError::Closed) => {
                        outcome.dropped += 1;
                        debug!("Connection {} closed during broadcast", connection.id());
                    }
                }
            }
        }

        trace!(
            "Broadcast for conversation {}: {:?}",
            envelope.conversation_id(),
            outcome
        );
        outcome
    }

    /// Number of open connections for one user.
    pub fn connection_count_for(&self, user_id: &UserId) -> usize {
        self.registry.connections_of(user_id).len()
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    pub fn user_count(&self) -> usize {
        self.registry.user_count()
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod hub_tests;
