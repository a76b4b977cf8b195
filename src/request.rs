//! HTTP request parsing (§4.2).
//!
//! The grammar here is deliberately simpler than a conforming HTTP
//! parser (no header folding, no chunked bodies): it matches the
//! line-based algorithm of the surveyed source exactly, rather than
//! delegating to a general-purpose parser like `httparse`, because the
//! two disagree on several edge cases pinned down explicitly here
//! (prefix-matched methods, `?`-terminated URLs, completion defined as
//! a trailing `\r\n\r\n` rather than a parsed blank line).

use crate::enums::Method;
use crate::headers::Headers;

/// A parsed HTTP request.
///
/// Immutable once built (§3): all setters live on the free function
/// [`parse`], not on this type.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    query: String,
    headers: Headers,
    complete: bool,
}

impl Request {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_ci(name)
    }

    /// True once a full request (start line through trailing blank line)
    /// was observed.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// True if the `Connection` header names `keep-alive`.
    pub fn wants_keep_alive(&self) -> bool {
        self.header("Connection")
            .map(|v| crate::headers::connection_has(v, "keep-alive"))
            .unwrap_or(false)
    }

    /// True if the `Connection`/`Upgrade` headers request a WebSocket
    /// upgrade (§4.8 step 3).
    pub fn wants_websocket_upgrade(&self) -> bool {
        let conn_upgrade = self.header("Connection")
            .map(|v| crate::headers::connection_has(v, "upgrade"))
            .unwrap_or(false);
        let upgrade_ws = self.header("Upgrade")
            .map(|v| v.trim().eq_ignore_ascii_case("websocket"))
            .unwrap_or(false);
        conn_upgrade && upgrade_ws
    }
}

/// Is `buf` a complete request per §4.2 step 1: the last four received
/// bytes are `\r\n\r\n`.
pub fn is_complete(buf: &[u8]) -> bool {
    buf.len() >= 4 && &buf[buf.len() - 4..] == b"\r\n\r\n"
}

/// Split `buf` into lines, each keeping its trailing `\n`.
fn lines(buf: &[u8]) -> impl Iterator<Item = &[u8]> {
    buf.split_inclusive(|&b| b == b'\n')
}

/// A line is well-formed iff its length is > 2 and its penultimate byte
/// is `\r` (§4.2 step 2). The returned slice excludes the trailing
/// `\r\n`.
fn well_formed(line: &[u8]) -> Option<&[u8]> {
    if line.len() > 2 && line[line.len() - 2] == b'\r' {
        Some(&line[..line.len() - 2])
    } else {
        None
    }
}

const START_LINE_SUFFIX: &[u8] = b"HTTP/1.1";

fn parse_start_line(line: &[u8]) -> Option<(Method, String, String)> {
    if !line.ends_with(START_LINE_SUFFIX) {
        return None;
    }
    let method = Method::from_prefix(line);
    let rest = &line[..line.len() - START_LINE_SUFFIX.len()];
    let slash = rest.iter().position(|&b| b == b'/')?;
    let mut url_end = rest.len();
    let mut query_start = None;
    for (i, &b) in rest.iter().enumerate().skip(slash) {
        if b == b'?' {
            query_start = Some(i + 1);
            url_end = i;
            break;
        }
        if b == b' ' {
            url_end = i;
            break;
        }
    }
    let url = String::from_utf8_lossy(&rest[slash..url_end]).into_owned();
    let query = match query_start {
        Some(start) => {
            let end = rest[start..].iter().position(|&b| b == b' ')
                .map(|p| start + p)
                .unwrap_or(rest.len());
            String::from_utf8_lossy(&rest[start..end]).into_owned()
        }
        None => String::new(),
    };
    Some((method, url, query))
}

fn parse_header_line(line: &[u8]) -> Option<(String, String)> {
    let colon = line.iter().position(|&b| b == b':')?;
    let mut value_start = colon + 1;
    if value_start < line.len() && line[value_start] == b' ' {
        value_start += 1;
    }
    let name = String::from_utf8_lossy(&line[..colon]).into_owned();
    let value = String::from_utf8_lossy(&line[value_start..]).into_owned();
    Some((name, value))
}

/// Parse a (possibly incomplete) request out of `buf`.
///
/// If no well-formed start line is found, the returned request has
/// `method() == Method::Invalid` and empty url/query (§4.2 "Failure").
/// The parser itself never errors; it's the caller's job to map
/// `Invalid`/an unmatched URL to a response status (§4.8).
pub fn parse(buf: &[u8]) -> Request {
    let complete = is_complete(buf);
    let mut method = Method::Invalid;
    let mut url = String::new();
    let mut query = String::new();
    let mut headers = Headers::new();
    let mut found_start_line = false;

    for raw_line in lines(buf) {
        let line = match well_formed(raw_line) {
            Some(l) => l,
            None => continue,
        };
        if !found_start_line {
            if let Some((m, u, q)) = parse_start_line(line) {
                method = m;
                url = u;
                query = q;
                found_start_line = true;
                continue;
            }
        }
        if let Some((name, value)) = parse_header_line(line) {
            headers.insert(name, value);
        }
    }

    Request { method, url, query, headers, complete }
}
