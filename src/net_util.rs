//! Small helpers shared by the HTTP connection driver and the
//! WebSocket driver thread, both of which write to non-blocking sockets.

use std::io::{self, ErrorKind, Write};
use std::thread;
use std::time::Duration;

const RETRY_SLEEP: Duration = Duration::from_millis(2);

pub fn would_block(err: &io::Error) -> bool {
    err.kind() == ErrorKind::WouldBlock
}

/// Write the whole buffer to a non-blocking writer, briefly sleeping
/// and retrying on `WouldBlock` rather than giving up.
pub fn write_all_nonblocking<W: Write>(writer: &mut W, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        match writer.write(buf) {
            Ok(0) => return Err(io::Error::new(ErrorKind::WriteZero, "socket closed")),
            Ok(n) => buf = &buf[n..],
            Err(ref e) if would_block(e) => thread::sleep(RETRY_SLEEP),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
