use std::time::Duration;

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;
pub const DEFAULT_RATE_LIMIT_COUNT: usize = 60;
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Per-connection protocol knobs shared by both pumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Capacity of each connection's outbound queue.
    pub queue_capacity: usize,
    /// Deadline for a single write, including pings and the close frame.
    pub write_wait: Duration,
    /// How long the inbound side waits for a pong before giving up on the peer.
    pub pong_wait: Duration,
    /// Interval between keep-alive pings. Must stay below `pong_wait`.
    pub ping_period: Duration,
    pub max_message_size: usize,
    pub rate_limit_count: usize,
    pub rate_limit_window: Duration,
}

impl ConnectionSettings {
    /// Ping at nine tenths of the pong wait so a healthy peer always answers in time.
    pub fn ping_period_for(pong_wait: Duration) -> Duration {
        pong_wait * 9 / 10
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            write_wait: DEFAULT_WRITE_WAIT,
            pong_wait: DEFAULT_PONG_WAIT,
            ping_period: Self::ping_period_for(DEFAULT_PONG_WAIT),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            rate_limit_count: DEFAULT_RATE_LIMIT_COUNT,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
        }
    }
}
