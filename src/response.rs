//! HTTP response construction and serialization (§4.3).

use crate::enums::Status;
use crate::headers::Headers;

/// Supplies the `Date` header value.
///
/// Out of scope per §1 ("date formatting" is an external collaborator);
/// the core only depends on this contract. [`HttpDate`] is the default,
/// backed by the `httpdate` crate (RFC 1123 format).
pub trait DateSource: Send + Sync {
    fn now(&self) -> String;
}

/// Default [`DateSource`], formatting the current time per RFC 1123.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDate;

impl DateSource for HttpDate {
    fn now(&self) -> String {
        httpdate::fmt_http_date(std::time::SystemTime::now())
    }
}

/// A built HTTP response (§3 Response Message).
///
/// Constructed with a status code (which auto-injects a `Date` header),
/// then mutated with [`Response::add_content`] and
/// [`Response::add_headers`], then serialized with [`Response::bytes`].
/// Adding content or headers after serialization invalidates the cached
/// blob so the next [`Response::bytes`] call re-serializes.
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    headers: Headers,
    content: Option<Vec<u8>>,
    blob: Option<Vec<u8>>,
}

impl Response {
    /// Start a new response for `status`, auto-injecting `Date`.
    pub fn new(status: Status) -> Response {
        Response::with_date_source(status, &HttpDate)
    }

    pub fn with_date_source(status: Status, date: &dyn DateSource) -> Response {
        let mut headers = Headers::new();
        headers.insert("Date", date.now());
        Response { status, headers, content: None, blob: None }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    /// Attach a body, injecting `Content-Length` and `Content-Type`.
    /// Invalidates the cached serialized blob.
    pub fn add_content(&mut self, content: Vec<u8>, content_type: &str) {
        self.headers.insert("Content-Length", content.len().to_string());
        self.headers.insert("Content-Type", content_type);
        self.content = Some(content);
        self.blob = None;
    }

    /// Add arbitrary extra headers. Invalidates the cached serialized
    /// blob.
    pub fn add_headers<I, N, V>(&mut self, headers: I)
        where I: IntoIterator<Item = (N, V)>,
              N: Into<String>,
              V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name, value);
        }
        self.blob = None;
    }

    /// True if the content-type/content invariant (§4.3 validity
    /// precondition) holds: `image/webp` and `text/html` bodies must be
    /// non-empty.
    fn invariant_holds(&self) -> bool {
        match self.headers.get_ci("Content-Type") {
            Some(ct) if ct.starts_with("image/webp") || ct.starts_with("text/html") => {
                self.content.as_ref().map(|c| c.len() >= 2).unwrap_or(false)
            }
            _ => true,
        }
    }

    /// Serialize (using the cached blob if still valid) into:
    /// `HTTP/1.1 <code> <reason>\r\n` + headers + `\r\n` + body.
    pub fn bytes(&mut self) -> &[u8] {
        if self.blob.is_none() {
            debug_assert!(self.invariant_holds(),
                "content/content-type invariant violated for {:?}", self.status);
            self.blob = Some(self.serialize());
        }
        self.blob.as_deref().unwrap()
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(
            format!("HTTP/1.1 {} {}\r\n", self.status.code(), self.status.reason())
                .as_bytes());
        for (name, value) in self.headers.iter() {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\r\n");
        if let Some(content) = &self.content {
            out.extend_from_slice(content);
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct FixedDate(&'static str);
    impl DateSource for FixedDate {
        fn now(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn status_line_and_headers_are_well_formed() {
        let mut r = Response::with_date_source(Status::Ok200, &FixedDate("Mon, 01 Jan 2026 00:00:00 GMT"));
        r.add_content(b"hi".to_vec(), "text/plain");
        let bytes = r.bytes().to_vec();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 Ok\r\n"));
        assert!(text.contains("Content-Length: 2\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Date: Mon, 01 Jan 2026 00:00:00 GMT\r\n"));
        assert!(text.ends_with("\r\n\r\nhi"));
    }

    #[test]
    fn mutation_invalidates_cached_blob() {
        let mut r = Response::with_date_source(Status::Ok200, &FixedDate("x"));
        r.add_content(b"a".to_vec(), "text/plain");
        let first = r.bytes().to_vec();
        r.add_headers(vec![("X-Extra", "1")]);
        let second = r.bytes().to_vec();
        assert_ne!(first, second);
        assert!(String::from_utf8(second).unwrap().contains("X-Extra: 1"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn html_body_must_be_non_empty() {
        let mut r = Response::with_date_source(Status::Ok200, &FixedDate("x"));
        r.add_content(b"h".to_vec(), "text/html; charset=utf-8");
        r.bytes();
    }
}
