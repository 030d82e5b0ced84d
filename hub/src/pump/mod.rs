//! The two per-connection loops.
//!
//! Both are generic over the socket halves so they can run on an axum
//! `WebSocket` in production and on in-memory channels in tests. Whichever pump
//! stops first unregisters the connection, which wakes the other one.

use std::fmt;

pub mod inbound;
pub mod outbound;

pub use inbound::run_inbound;
pub use outbound::run_outbound;

/// Transport failures. Each one ends only the connection it happened on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Write(String),
    /// A write did not complete within the write deadline.
    Deadline,
    Read(String),
    /// No frame arrived within the pong wait.
    TimedOut,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Write(e) => write!(f, "write failed: {e}"),
            TransportError::Deadline => write!(f, "write deadline exceeded"),
            TransportError::Read(e) => write!(f, "read failed: {e}"),
            TransportError::TimedOut => write!(f, "keep-alive timeout"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Why a pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// The peer sent a close frame.
    ClosedByPeer,
    /// The underlying stream ended without a close frame.
    StreamEnded,
    /// The connection was unregistered elsewhere.
    Unregistered,
    Failed(TransportError),
}

impl PumpExit {
    pub fn is_failure(&self) -> bool {
        matches!(self, PumpExit::Failed(_))
    }
}

impl fmt::Display for PumpExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PumpExit::ClosedByPeer => write!(f, "closed by peer"),
            PumpExit::StreamEnded => write!(f, "stream ended"),
            PumpExit::Unregistered => write!(f, "unregistered"),
            PumpExit::Failed(e) => e.fmt(f),
        }
    }
}
