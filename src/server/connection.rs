//! Per-connection HTTP receive state and the HTTP receive tick (§3
//! "Per-Connection Receive State", §4.7 "HTTP receive tick").

use std::io::{self, ErrorKind, Read};
use std::net::TcpStream;
use std::time::Instant;

use crate::buffer::ByteBuffer;
use crate::request::{self, Request};
use crate::server::config::Config;
use crate::timer::Stopwatch;

/// What a single [`Connection::tick`] call observed.
pub enum TickOutcome {
    /// No complete request yet; nothing to do this tick.
    Idle,
    /// A complete request was parsed. The receive timeout was reset.
    Request(Request),
    /// The peer closed its end cleanly (`read` returned `Ok(0)`). No
    /// response is attempted.
    PeerClosed,
    /// `recv` failed with something other than "would block" (§7 "I/O
    /// errors"): logged, and a 500 is attempted if the socket still
    /// accepts writes.
    IoError(io::Error),
    /// The 5-second no-data timeout elapsed (§4.7 step 5, §8
    /// invariant 5).
    TimedOut,
}

/// One accepted HTTP socket, still owned by the accept loop.
pub struct Connection {
    pub stream: TcpStream,
    buffer: ByteBuffer,
    timeout: Stopwatch,
    heartbeat: Stopwatch,
}

impl Connection {
    pub fn new(stream: TcpStream, config: &Config) -> io::Result<Connection> {
        stream.set_nonblocking(true)?;
        Ok(Connection {
            stream,
            buffer: ByteBuffer::with_growth(config.buffer_growth),
            timeout: Stopwatch::new(config.receive_timeout),
            heartbeat: Stopwatch::new(config.connection_heartbeat),
        })
    }

    /// Drop the bytes of an already-dispatched request and get ready
    /// for the next one on a keep-alive connection (§9: leftover
    /// pipelined bytes are not carried forward, so this is always a
    /// full reset, never a partial `consume`).
    pub fn reset_for_next_request(&mut self, now: Instant) {
        self.buffer.reset();
        self.timeout.reset(now);
    }

    /// §4.7 "HTTP receive tick".
    pub fn tick(&mut self, config: &Config, now: Instant) -> TickOutcome {
        let mut scratch = vec![0u8; config.recv_scratch_size];
        match self.stream.read(&mut scratch) {
            Ok(0) => TickOutcome::PeerClosed,
            Ok(n) => {
                self.buffer.append(&scratch[..n]);
                if request::is_complete(self.buffer.data()) {
                    let parsed = request::parse(self.buffer.data());
                    self.timeout.reset(now);
                    TickOutcome::Request(parsed)
                } else {
                    TickOutcome::Idle
                }
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                if self.heartbeat.duration_reached(now) {
                    log::trace!("connection awaiting data");
                }
                if self.timeout.duration_reached(now) {
                    TickOutcome::TimedOut
                } else {
                    TickOutcome::Idle
                }
            }
            Err(e) => TickOutcome::IoError(e),
        }
    }
}
