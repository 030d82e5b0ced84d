use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Rolling-window limiter: at most `limit` acquisitions in any `window`.
///
/// Keeps the timestamps of the accepted acquisitions still inside the window.
/// Rejected attempts are not recorded and do not extend the wait.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    accepted: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            accepted: VecDeque::with_capacity(limit.min(1024)),
        }
    }

    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&mut self, now: Instant) -> bool {
        while let Some(&oldest) = self.accepted.front() {
            if now.duration_since(oldest) >= self.window {
                self.accepted.pop_front();
            } else {
                break;
            }
        }

        if self.accepted.len() < self.limit {
            self.accepted.push_back(now);
            true
        } else {
            false
        }
    }
}
