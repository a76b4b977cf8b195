//! Append-only growable byte buffer backing a single socket's incoming
//! stream.
//!
//! A single owner, contiguous storage, and a `reset` that drops the
//! contents without shrinking the allocation so repeated requests on a
//! keep-alive connection don't thrash the allocator.

/// How a [`ByteBuffer`] grows its backing storage when it runs out of
/// capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Add exactly one fixed-size chunk per grow. This is the literal
    /// policy of the surveyed source and yields quadratic total work
    /// for a buffer that grows from 0 to N bytes one chunk at a time.
    /// Kept for fidelity and because small HTTP headers never exercise
    /// the quadratic tail.
    Chunked(usize),
    /// Double the capacity (or grow to fit, whichever is larger). Avoids
    /// the quadratic blowup; this is the default.
    Geometric,
}

impl Default for GrowthPolicy {
    fn default() -> GrowthPolicy {
        GrowthPolicy::Geometric
    }
}

const DEFAULT_CHUNK: usize = 1024;

/// Append-only growable byte buffer.
///
/// Invariants: storage is contiguous; `len() <= capacity()`; `reset()`
/// zeroes the contents and sets `len()` to zero without shrinking
/// capacity.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    growth: GrowthPolicy,
}

impl ByteBuffer {
    /// Create an empty buffer using the default (geometric) growth policy.
    pub fn new() -> ByteBuffer {
        ByteBuffer::with_growth(GrowthPolicy::default())
    }

    /// Create an empty buffer using a specific growth policy.
    pub fn with_growth(growth: GrowthPolicy) -> ByteBuffer {
        ByteBuffer { data: Vec::new(), growth }
    }

    /// Append bytes to the buffer, growing capacity as needed.
    pub fn append(&mut self, bytes: &[u8]) {
        let needed = self.data.len() + bytes.len();
        if needed > self.data.capacity() {
            self.grow_to(needed);
        }
        self.data.extend_from_slice(bytes);
    }

    fn grow_to(&mut self, needed: usize) {
        match self.growth {
            GrowthPolicy::Chunked(chunk) => {
                let chunk = if chunk == 0 { DEFAULT_CHUNK } else { chunk };
                while self.data.capacity() < needed {
                    self.data.reserve_exact(chunk);
                }
            }
            GrowthPolicy::Geometric => {
                let target = (self.data.capacity() * 2).max(needed).max(64);
                self.data.reserve(target - self.data.len());
            }
        }
    }

    /// Zero the contents and set length to zero. Capacity is unchanged.
    pub fn reset(&mut self) {
        for b in self.data.iter_mut() {
            *b = 0;
        }
        self.data.clear();
    }

    /// Drop the first `n` bytes, shifting the remainder to the front.
    ///
    /// The WebSocket driver uses this to drop exactly the bytes one
    /// decoded frame consumed, keeping any trailing partial frame in
    /// place for the next read. The HTTP side never calls this with a
    /// partial count: a keep-alive connection starts its next request
    /// with a full `reset()` instead, since leftover pipelined bytes
    /// are not carried forward.
    pub fn consume(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if n >= self.data.len() {
            self.reset();
        } else {
            self.data.drain(..n);
        }
    }

    /// Current number of bytes held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current allocated capacity.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Read-only view of the held bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Default for ByteBuffer {
    fn default() -> ByteBuffer {
        ByteBuffer::new()
    }
}

#[cfg(test)]
mod test {
    use super::{ByteBuffer, GrowthPolicy};

    #[test]
    fn append_and_len() {
        let mut buf = ByteBuffer::new();
        buf.append(b"hello");
        buf.append(b" world");
        assert_eq!(buf.len(), 11);
        assert_eq!(buf.data(), b"hello world");
    }

    #[test]
    fn reset_zeroes_and_keeps_capacity() {
        let mut buf = ByteBuffer::new();
        buf.append(b"hello");
        let cap = buf.capacity();
        buf.reset();
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
        assert!(buf.capacity() >= cap);
    }

    #[test]
    fn chunked_growth_adds_fixed_increments() {
        let mut buf = ByteBuffer::with_growth(GrowthPolicy::Chunked(4));
        buf.append(b"ab");
        assert!(buf.capacity() >= 4);
        buf.append(b"cdefg");
        assert!(buf.capacity() >= 7);
        assert_eq!(buf.data(), b"abcdefg");
    }

    #[test]
    fn consume_drops_prefix() {
        let mut buf = ByteBuffer::new();
        buf.append(b"GET / HTTP/1.1\r\n\r\nGET /next HTTP/1.1\r\n\r\n");
        buf.consume(18);
        assert_eq!(buf.data(), b"GET /next HTTP/1.1\r\n\r\n");
    }
}
