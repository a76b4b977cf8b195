//! A small, embeddable HTTP/1.1 server with an in-process upgrade path
//! to a minimal RFC 6455 WebSocket transport.
//!
//! The accept loop and every per-connection driver run on plain
//! `std::thread`s over non-blocking sockets rather than on a reactor:
//! one thread per listener, one thread per upgraded WebSocket
//! connection, HTTP connections all served from the single accept
//! thread. See `DESIGN.md` for why this departs from the usual
//! `futures`-reactor shape of this crate's sibling protocol libraries.

pub mod buffer;
pub mod enums;
mod error;
pub mod headers;
mod net_util;
pub mod request;
pub mod response;
pub mod server;
mod timer;
pub mod websocket;

pub use crate::error::{Error, FrameError};
pub use crate::server::ListenServer;

/// Construct a server with default HTTP and WebSocket tunables (§6).
/// Use [`ListenServer::new`] directly to supply non-default
/// [`server::Config`]/[`websocket::Config`] values.
pub fn new() -> ListenServer {
    ListenServer::new(server::Config::new().done(), websocket::Config::new().done())
}

#[allow(unused)]
fn _assert_send_sync() {
    fn assert<T: Send + Sync>() {}
    assert::<ListenServer>();
}
