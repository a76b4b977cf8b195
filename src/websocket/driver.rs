//! The per-connection WebSocket driver thread (§4.7 "WebSocket driver
//! thread"), grounded on the shape of `websocket::dispatcher::Loop`
//! from the sibling protocol crate this one is descended from, adapted
//! from a `futures` poll loop to a blocking thread over a non-blocking
//! socket.

use std::io::Read;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::buffer::ByteBuffer;
use crate::net_util::{would_block, write_all_nonblocking};
use crate::websocket::codec::{decode, encode, Opcode};
use crate::websocket::config::Config;
use crate::websocket::queue::RecvHandle;
use crate::websocket::reassembly::Reassembler;

const RECV_SCRATCH: usize = 4096;
const IDLE_SLEEP: Duration = Duration::from_millis(5);

/// Invoked once per completed logical message (§6 `on-receive`).
pub type ReceiveCallback = dyn Fn(&[u8], Opcode) + Send + Sync;

/// Run the blocking driver loop for one upgraded connection until the
/// peer disconnects, the idle timeout elapses, or `shutdown` is
/// observed set. Always shuts down and closes the socket on the way out
/// (§4.7, resolving the source's "never closes" gap).
pub fn run(
    mut stream: TcpStream,
    config: Arc<Config>,
    outbound: RecvHandle,
    on_receive: Arc<ReceiveCallback>,
    shutdown: Arc<AtomicBool>,
) {
    let _ = stream.set_nonblocking(true);

    let mut buffer = ByteBuffer::new();
    let mut reassembler = Reassembler::new();
    let mut scratch = [0u8; RECV_SCRATCH];
    let mut last_message = Instant::now();
    let mut last_heartbeat = Instant::now();

    'driver: loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        for frame in outbound.drain() {
            let bytes = encode(true, frame.opcode, &frame.payload);
            if write_all_nonblocking(&mut stream, &bytes).is_err() {
                break 'driver;
            }
        }

        match stream.read(&mut scratch) {
            Ok(0) => break,
            Ok(n) => {
                buffer.append(&scratch[..n]);
                let mut consumed_total = 0;
                loop {
                    let view = &buffer.data()[consumed_total..];
                    match decode(view, config.max_frame_payload) {
                        Ok(Some((frame, consumed))) => {
                            consumed_total += consumed;
                            match reassembler.feed(frame) {
                                Ok(Some(message)) => {
                                    last_message = Instant::now();
                                    on_receive(&message.payload, message.opcode);
                                }
                                Ok(None) => {}
                                Err(e) => {
                                    log::warn!("websocket reassembly error: {}", e);
                                    break 'driver;
                                }
                            }
                        }
                        Ok(None) => break,
                        Err(_) => {
                            // malformed frame: this connection is done.
                            break 'driver;
                        }
                    }
                }
                buffer.consume(consumed_total);
            }
            Err(ref e) if would_block(e) => {}
            Err(_) => break,
        }

        let now = Instant::now();
        if now.saturating_duration_since(last_heartbeat) > config.heartbeat_interval {
            last_heartbeat = now;
            log::trace!("websocket connection awaiting data");
        }
        if now.saturating_duration_since(last_message) > config.idle_timeout {
            log::debug!("websocket connection idle timeout, ending driver");
            break;
        }

        thread::sleep(IDLE_SLEEP);
    }

    let _ = stream.shutdown(Shutdown::Both);
}
