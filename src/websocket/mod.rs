//! The WebSocket codec and per-connection driver (§4.4–§4.7, C3/C4).

pub mod codec;
pub mod config;
mod driver;
pub mod keys;
pub mod queue;
mod reassembly;

pub use self::codec::{Frame, Opcode};
pub use self::config::Config;
pub use self::driver::{run, ReceiveCallback};
pub use self::reassembly::{Message, Reassembler};
