//! The outbound frame send queue (§3 "Thread-Safe Queue", §5, §9).
//!
//! The surveyed source couples a mutex with a hand-rolled FIFO and
//! exposes a "take the queue exclusively" operation that leaks the
//! lock. This models the same single-producer/single-consumer
//! handoff as a channel instead (§9 design note): the embedder's
//! `send_websocket` call is the producer side, the driver thread's
//! loop is the sole consumer, and neither side ever sees a raw
//! container.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::websocket::codec::Opcode;

/// One outbound message queued for a WebSocket driver thread to send.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub opcode: Opcode,
    pub payload: Vec<u8>,
}

/// Producer half, handed out to the embedder as the registered
/// send-function for a connected client (§3 "WebSocket Endpoint
/// Descriptor").
#[derive(Clone)]
pub struct SendHandle {
    tx: Sender<Outbound>,
}

impl SendHandle {
    /// Enqueue an outbound frame. Returns `Err` if the driver thread
    /// has already exited (e.g. the peer disconnected).
    pub fn send(&self, opcode: Opcode, payload: Vec<u8>) -> Result<(), ()> {
        self.tx.send(Outbound { opcode, payload }).map_err(|_| ())
    }
}

/// Consumer half, owned by a single WebSocket driver thread.
pub struct RecvHandle {
    rx: Receiver<Outbound>,
}

impl RecvHandle {
    /// Drain every frame currently queued, in FIFO order, without
    /// blocking (§4.7 "each iteration, drain the outbound frame queue").
    pub fn drain(&self) -> Vec<Outbound> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(item) => out.push(item),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

/// Create a fresh queue for one WebSocket connection.
pub fn channel() -> (SendHandle, RecvHandle) {
    let (tx, rx) = mpsc::channel();
    (SendHandle { tx }, RecvHandle { rx })
}
