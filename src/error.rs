use std::io;

use quick_error::quick_error;

quick_error! {
    /// Errors surfaced by the public API.
    ///
    /// Per-connection failures (a malformed frame, a single `recv` error)
    /// are handled locally at the connection level and never reach here;
    /// this enum is for failures that abort a whole server (bind/listen)
    /// or a single `register_*`/`send_websocket` call.
    #[derive(Debug)]
    pub enum Error {
        /// Binding or accepting on the listen socket failed.
        Io(err: io::Error) {
            description("I/O error")
            display("I/O error: {}", err)
            from()
        }
        /// `send_websocket` targeted a URL that was never registered as a
        /// WebSocket endpoint.
        UnknownWebsocketUrl(url: String) {
            description("unknown websocket url")
            display("no websocket endpoint registered for {:?}", url)
        }
        /// `send_websocket` targeted a client id that is no longer
        /// connected (or never was).
        UnknownClient(url: String, id: u64) {
            description("unknown websocket client id")
            display("no client {} connected to {:?}", id, url)
        }
        /// The server was asked to start twice, or to register a URL
        /// after it had already started.
        AlreadyStarted {
            description("server is already running")
        }
    }
}

quick_error! {
    /// Failures local to decoding one WebSocket frame.
    ///
    /// Unlike [`Error`], a `FrameError` never escapes a single connection:
    /// the driver logs it and tears down that connection only.
    #[derive(Debug)]
    pub enum FrameError {
        Io(err: io::Error) {
            description("I/O error")
            display("I/O error: {}", err)
            from()
        }
        /// Frame declared a payload larger than the configured limit.
        TooLong(len: u64, limit: usize) {
            description("frame exceeds configured maximum size")
            display("frame of {} bytes exceeds limit of {} bytes", len, limit)
        }
        /// Opcode outside {continuation, text, binary}.
        InvalidOpcode(code: u8) {
            description("invalid websocket opcode")
            display("invalid websocket opcode {:#x}", code)
        }
        /// A continuation frame arrived with no message in progress.
        UnexpectedContinuation {
            description("continuation frame with no message in progress")
        }
    }
}
