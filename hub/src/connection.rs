use crate::envelope::Envelope;
use events::UserId;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Protocol state. Moves forward only: `Open → Closing → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Open = 0,
    /// Unregistered; the outbound pump is flushing and sending the close frame.
    Closing = 1,
    /// Both pumps are done with the transport.
    Closed = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Open,
            1 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

/// Why an envelope could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    /// The outbound queue is at capacity; the delivery is dropped.
    Full,
    /// The connection has been unregistered.
    Closed,
}

impl fmt::Display for EnqueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnqueueError::Full => write!(f, "outbound queue is full"),
            EnqueueError::Closed => write!(f, "connection is closed"),
        }
    }
}

impl std::error::Error for EnqueueError {}

/// Receiving half of a connection's outbound queue, consumed by the outbound pump.
pub type OutboundQueue = mpsc::Receiver<Arc<Envelope>>;

/// One authenticated WebSocket session.
///
/// The two pumps own the connection through `Arc`s; the registry only keeps a
/// `Weak`. `close` is the shared "closed" signal both pumps select on.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    user_id: UserId,
    sender: mpsc::Sender<Arc<Envelope>>,
    closed: CancellationToken,
    state: AtomicU8,
    dropped: AtomicU64,
}

impl Connection {
    /// Create a connection for `user_id` together with the receiving end of its
    /// outbound queue. A capacity of zero is raised to one.
    pub fn new(user_id: UserId, capacity: usize) -> (Arc<Self>, OutboundQueue) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let connection = Arc::new(Self {
            id: ConnectionId::new(),
            user_id,
            sender,
            closed: CancellationToken::new(),
            state: AtomicU8::new(ConnectionState::Open as u8),
            dropped: AtomicU64::new(0),
        });
        (connection, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Deliveries dropped because the outbound queue was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Offer an envelope without waiting for queue space.
    pub fn try_enqueue(&self, envelope: Arc<Envelope>) -> Result<(), EnqueueError> {
        if self.closed.is_cancelled() {
            return Err(EnqueueError::Closed);
        }

        self.sender.try_send(envelope).map_err(|e| match e {
            TrySendError::Full(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                EnqueueError::Full
            }
            TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }

    /// Raise the closed signal. Later calls are no-ops.
    pub fn close(&self) {
        let _ = self.state.compare_exchange(
            ConnectionState::Open as u8,
            ConnectionState::Closing as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.closed.cancelled()
    }

    /// Record that the transport has been released.
    pub(crate) fn mark_closed(&self) {
        self.closed.cancel();
        self.state
            .store(ConnectionState::Closed as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConversationId;
    use serde_json::json;

    fn envelope() -> Arc<Envelope> {
        Arc::new(Envelope::new_message(ConversationId::new_v4(), json!({"content": "hi"})).unwrap())
    }

    #[test]
    fn test_full_queue_drops_and_counts() {
        let (conn, _queue) = Connection::new(UserId::new_v4(), 1);

        assert_eq!(conn.try_enqueue(envelope()), Ok(()));
        assert_eq!(conn.try_enqueue(envelope()), Err(EnqueueError::Full));
        assert_eq!(conn.try_enqueue(envelope()), Err(EnqueueError::Full));
        assert_eq!(conn.dropped_count(), 2);
    }

    #[test]
    fn test_enqueue_after_close_is_rejected() {
        let (conn, mut queue) = Connection::new(UserId::new_v4(), 4);
        conn.close();

        assert_eq!(conn.try_enqueue(envelope()), Err(EnqueueError::Closed));
        assert!(queue.try_recv().is_err());
        assert_eq!(conn.dropped_count(), 0);
    }

    #[test]
    fn test_state_moves_forward_only() {
        let (conn, _queue) = Connection::new(UserId::new_v4(), 4);
        assert_eq!(conn.state(), ConnectionState::Open);

        conn.close();
        assert_eq!(conn.state(), ConnectionState::Closing);

        conn.mark_closed();
        conn.close();
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let (conn, _queue) = Connection::new(UserId::new_v4(), 0);
        assert_eq!(conn.try_enqueue(envelope()), Ok(()));
    }

    #[tokio::test]
    async fn test_closed_future_resolves_after_close() {
        let (conn, _queue) = Connection::new(UserId::new_v4(), 1);
        let waiter = {
            let conn = conn.clone();
            tokio::spawn(async move { conn.closed().await })
        };
        conn.close();
        waiter.await.unwrap();
        assert!(conn.is_closed());
    }
}
