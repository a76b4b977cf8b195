//! Handshake key derivation (§4.9, §8 invariant 4).

use std::fmt;

use sha1::{Digest, Sha1};

/// Handshake magic: the fixed GUID from RFC 6455, concatenated with the
/// client's nonce before SHA-1.
pub const GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// The `Sec-WebSocket-Accept` header value.
pub struct Accept([u8; 20]);

impl Accept {
    /// Derive the accept value from the raw (base64-encoded, as received
    /// in the header) `Sec-WebSocket-Key` value.
    ///
    /// Note: this does not validate the key's shape — not required by
    /// RFC 6455, and the upstream handshake never checked it either.
    pub fn from_key(key: &str) -> Accept {
        let mut hasher = Sha1::new();
        hasher.update(key.trim().as_bytes());
        hasher.update(GUID.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest);
        Accept(bytes)
    }
}

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                              abcdefghijklmnopqrstuvwxyz\
                              0123456789+/";

impl fmt::Display for Accept {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut buf = [0u8; 28];
        for i in 0..6 {
            let n = ((self.0[i * 3] as usize) << 16)
                | ((self.0[i * 3 + 1] as usize) << 8)
                | (self.0[i * 3 + 2] as usize);
            buf[i * 4] = BASE64_CHARS[(n >> 18) & 63];
            buf[i * 4 + 1] = BASE64_CHARS[(n >> 12) & 63];
            buf[i * 4 + 2] = BASE64_CHARS[(n >> 6) & 63];
            buf[i * 4 + 3] = BASE64_CHARS[n & 63];
        }
        let n = ((self.0[18] as usize) << 16) | ((self.0[19] as usize) << 8);
        buf[24] = BASE64_CHARS[(n >> 18) & 63];
        buf[25] = BASE64_CHARS[(n >> 12) & 63];
        buf[26] = BASE64_CHARS[(n >> 6) & 63];
        buf[27] = b'=';
        f.write_str(std::str::from_utf8(&buf).unwrap())
    }
}

impl fmt::Debug for Accept {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "websocket::Accept({})", self)
    }
}

#[cfg(test)]
mod test {
    use super::Accept;

    #[test]
    fn rfc6455_example_handshake() {
        let accept = Accept::from_key("dGhlIHNhbXBsZSBub25jZQ==");
        assert_eq!(accept.to_string(), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
    }
}
