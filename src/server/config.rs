use std::sync::Arc;
use std::time::Duration;

use crate::buffer::GrowthPolicy;

/// Tunables for the accept loop and per-connection HTTP driver (§1.1,
/// §4.7, §4.10).
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) receive_timeout: Duration,
    pub(crate) connection_heartbeat: Duration,
    pub(crate) accept_loop_heartbeat: Duration,
    pub(crate) recv_scratch_size: usize,
    pub(crate) buffer_growth: GrowthPolicy,
    pub(crate) idle_sleep: Duration,
}

impl Config {
    /// Create a config with defaults: 5s receive timeout, 250ms
    /// per-connection heartbeat, 500ms accept-loop heartbeat, 512-byte
    /// recv scratch buffer, geometric byte-buffer growth.
    pub fn new() -> Config {
        Config {
            receive_timeout: Duration::from_secs(5),
            connection_heartbeat: Duration::from_millis(250),
            accept_loop_heartbeat: Duration::from_millis(500),
            recv_scratch_size: 512,
            buffer_growth: GrowthPolicy::Geometric,
            idle_sleep: Duration::from_millis(2),
        }
    }

    /// No-data timeout before a 408 is sent (§4.7 step 5, §8 invariant 5).
    pub fn receive_timeout(&mut self, dur: Duration) -> &mut Self {
        self.receive_timeout = dur;
        self
    }

    /// Cadence of the per-connection "awaiting data" heartbeat log
    /// (§4.7 step 4).
    pub fn connection_heartbeat(&mut self, dur: Duration) -> &mut Self {
        self.connection_heartbeat = dur;
        self
    }

    /// Cadence of the accept loop's own heartbeat log (§4.10 step 4).
    pub fn accept_loop_heartbeat(&mut self, dur: Duration) -> &mut Self {
        self.accept_loop_heartbeat = dur;
        self
    }

    /// Size of the scratch buffer each non-blocking `recv` reads into
    /// (§4.7 step 1, "≤ 512 bytes").
    pub fn recv_scratch_size(&mut self, size: usize) -> &mut Self {
        self.recv_scratch_size = size;
        self
    }

    /// Growth policy for each connection's [`crate::buffer::ByteBuffer`]
    /// (§9 resolution: geometric by default, fixed-chunk available).
    pub fn buffer_growth(&mut self, policy: GrowthPolicy) -> &mut Self {
        self.buffer_growth = policy;
        self
    }

    /// `Arc`-wrap for sharing with the accept-loop thread.
    pub fn done(&mut self) -> Arc<Config> {
        Arc::new(self.clone())
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}
