use std::sync::Arc;
use std::time::Duration;

/// Tunables for the per-connection WebSocket driver (§1.1, §4.7).
///
/// Built with the same `Config::new() ... .done()` idiom the HTTP-side
/// [`crate::server::Config`] uses.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) idle_timeout: Duration,
    pub(crate) heartbeat_interval: Duration,
    pub(crate) max_frame_payload: usize,
}

impl Config {
    /// Create a config with defaults: 600s idle timeout, 250ms
    /// heartbeat, 10MiB max frame payload.
    pub fn new() -> Config {
        Config {
            idle_timeout: Duration::from_secs(600),
            heartbeat_interval: Duration::from_millis(250),
            max_frame_payload: 10 << 20,
        }
    }

    /// Overall idle timeout (§4.7, §5): if no complete logical message
    /// is reassembled within this long, the driver thread ends.
    pub fn idle_timeout(&mut self, dur: Duration) -> &mut Self {
        self.idle_timeout = dur;
        self
    }

    /// Interval between "still alive" heartbeat ticks (§4.7).
    pub fn heartbeat_interval(&mut self, dur: Duration) -> &mut Self {
        self.heartbeat_interval = dur;
        self
    }

    /// Largest single-frame payload the decoder will accept before
    /// aborting the connection: a DoS guard for the same reason
    /// `websocket::Config::max_packet_size` exists in the sibling
    /// protocol crate this one is descended from.
    pub fn max_frame_payload(&mut self, size: usize) -> &mut Self {
        self.max_frame_payload = size;
        self
    }

    /// `Arc`-wrap for sharing with driver threads.
    pub fn done(&mut self) -> Arc<Config> {
        Arc::new(self.clone())
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}
