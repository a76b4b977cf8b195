use std::fmt;

/// HTTP request method, as recognized by the request-line parser.
///
/// `Invalid` stands in for anything the parser couldn't prefix-match
/// against a known method name, or a request with no start line at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Invalid,
}

impl Method {
    /// Prefix-match `text` against the known method names, longest name
    /// (among those that share a prefix) winning so e.g. `PUT` doesn't
    /// shadow `PATCH`. Matches §4.2 step 3 of the request grammar: method
    /// names are matched by prefix, not by a following space.
    pub fn from_prefix(text: &[u8]) -> Method {
        const KNOWN: &[(&[u8], Method)] = &[
            (b"GET", Method::Get),
            (b"POST", Method::Post),
            (b"PATCH", Method::Patch),
            (b"PUT", Method::Put),
            (b"DELETE", Method::Delete),
        ];
        KNOWN.iter()
            .filter(|(name, _)| text.starts_with(name))
            .max_by_key(|(name, _)| name.len())
            .map(|(_, m)| *m)
            .unwrap_or(Method::Invalid)
    }

    /// True for the only method this server ever serves successfully.
    pub fn is_get(&self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Invalid => "Invalid-Request",
        })
    }
}

#[cfg(test)]
mod test {
    use super::Method;

    #[test]
    fn matches_known_methods() {
        assert_eq!(Method::from_prefix(b"GET /x HTTP/1.1"), Method::Get);
        assert_eq!(Method::from_prefix(b"POST /x HTTP/1.1"), Method::Post);
        assert_eq!(Method::from_prefix(b"PUT /x HTTP/1.1"), Method::Put);
        assert_eq!(Method::from_prefix(b"PATCH /x HTTP/1.1"), Method::Patch);
        assert_eq!(Method::from_prefix(b"DELETE /x HTTP/1.1"), Method::Delete);
    }

    #[test]
    fn put_does_not_shadow_patch() {
        assert_eq!(Method::from_prefix(b"PATCH /x"), Method::Patch);
    }

    #[test]
    fn unknown_is_invalid() {
        assert_eq!(Method::from_prefix(b"HEAD /x HTTP/1.1"), Method::Invalid);
        assert_eq!(Method::from_prefix(b""), Method::Invalid);
    }
}
