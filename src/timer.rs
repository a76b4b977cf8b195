//! MilliSec Stopwatch (§3 "Timer"): a `(last-check, threshold)` pair
//! used both by the HTTP receive-timeout/heartbeat machinery and by the
//! WebSocket driver's idle-timeout/heartbeat machinery.
//!
//! Uses [`std::time::Instant`], a monotonic clock, per §3's requirement
//! ("implementations must use a monotonic clock").

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Stopwatch {
    last_check: Instant,
    threshold: Duration,
}

impl Stopwatch {
    pub fn new(threshold: Duration) -> Stopwatch {
        Stopwatch { last_check: Instant::now(), threshold }
    }

    /// Returns `true` and resets the internal clock iff `now - last_check
    /// > threshold`.
    pub fn duration_reached(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_check) > self.threshold {
            self.last_check = now;
            true
        } else {
            false
        }
    }

    /// Reset the stopwatch to start counting from `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last_check = now;
    }

    pub fn elapsed_since(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_check)
    }
}
