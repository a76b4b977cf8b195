//! Continuation reassembly (§4.5): folds a sequence of decoded frames
//! into logical messages, the way `WebSocketMessage::ConcatMessage` does
//! in the surveyed source.

use crate::error::FrameError;
use crate::websocket::codec::{Frame, Opcode};

/// A fully reassembled logical message: the concatenation of a
/// non-continuation frame and any continuation frames that followed it,
/// carrying the opcode of the first frame (§3 "WebSocket Frame").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub opcode: Opcode,
    pub payload: Vec<u8>,
}

/// Accumulates frames for one connection into logical messages.
#[derive(Debug, Default)]
pub struct Reassembler {
    in_progress: Option<Message>,
}

impl Reassembler {
    pub fn new() -> Reassembler {
        Reassembler { in_progress: None }
    }

    /// Feed one decoded frame. Returns `Some(message)` once a frame with
    /// `fin = true` completes the logical message; the reassembler is
    /// reset for the next message at that point (§4.5 "the buffer is
    /// reset for the next message"). Errors if a continuation frame
    /// arrives with no message in progress.
    pub fn feed(&mut self, frame: Frame) -> Result<Option<Message>, FrameError> {
        match frame.opcode {
            Opcode::Continuation => {
                let msg = self.in_progress.as_mut()
                    .ok_or(FrameError::UnexpectedContinuation)?;
                msg.payload.extend_from_slice(&frame.payload);
            }
            _ => {
                self.in_progress = Some(Message {
                    opcode: frame.opcode,
                    payload: frame.payload,
                });
            }
        }

        if frame.fin {
            Ok(self.in_progress.take())
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn frame(fin: bool, opcode: Opcode, payload: &[u8]) -> Frame {
        Frame { fin, opcode, payload: payload.to_vec() }
    }

    #[test]
    fn single_frame_message_completes_immediately() {
        let mut r = Reassembler::new();
        let msg = r.feed(frame(true, Opcode::Text, b"hello")).unwrap().unwrap();
        assert_eq!(msg.opcode, Opcode::Text);
        assert_eq!(msg.payload, b"hello");
    }

    #[test]
    fn fragmentation_concatenates_and_keeps_first_opcode() {
        let mut r = Reassembler::new();
        assert!(r.feed(frame(false, Opcode::Text, b"he")).unwrap().is_none());
        assert!(r.feed(frame(false, Opcode::Continuation, b"ll")).unwrap().is_none());
        let msg = r.feed(frame(true, Opcode::Continuation, b"o")).unwrap().unwrap();
        assert_eq!(msg.opcode, Opcode::Text);
        assert_eq!(msg.payload, b"hello");
    }

    #[test]
    fn reassembly_is_associative_over_split_points() {
        let full = b"the quick brown fox jumps".to_vec();
        // try every way of splitting `full` into 1..=full.len() pieces,
        // with the last piece carrying fin=1.
        for k in 1..=full.len().min(6) {
            let chunk = (full.len() + k - 1) / k;
            let mut r = Reassembler::new();
            let mut result = None;
            for (i, piece) in full.chunks(chunk).enumerate() {
                let opcode = if i == 0 { Opcode::Binary } else { Opcode::Continuation };
                let is_last = (i + 1) * chunk >= full.len();
                result = r.feed(frame(is_last, opcode, piece)).unwrap();
            }
            let msg = result.expect("last frame must complete the message");
            assert_eq!(msg.payload, full);
            assert_eq!(msg.opcode, Opcode::Binary);
        }
    }

    #[test]
    fn reassembler_is_ready_for_next_message_after_completion() {
        let mut r = Reassembler::new();
        r.feed(frame(true, Opcode::Text, b"one")).unwrap();
        let second = r.feed(frame(true, Opcode::Binary, b"two")).unwrap().unwrap();
        assert_eq!(second.payload, b"two");
        assert_eq!(second.opcode, Opcode::Binary);
    }

    #[test]
    fn leading_continuation_is_an_error() {
        let mut r = Reassembler::new();
        let err = r.feed(frame(false, Opcode::Continuation, b"x")).unwrap_err();
        assert!(matches!(err, FrameError::UnexpectedContinuation));
    }
}
