//! Header storage shared by requests and responses, plus the small
//! case-insensitive token matchers the protocol needs (`close`,
//! `keep-alive`, `upgrade`, `websocket`).

use std::collections::BTreeMap;

/// A `header-name -> header-value` mapping.
///
/// Header names are stored exactly as received (case-sensitive, per
/// §3), and duplicate names are not merged — the last `insert` for a
/// given name wins, matching §4.2 step 4. `BTreeMap` gives a
/// deterministic iteration order for serialization, which makes
/// golden-output tests reproducible even though header order on the
/// wire is not otherwise meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Headers {
        Headers(BTreeMap::new())
    }

    pub fn insert<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.0.insert(name.into(), value.into());
    }

    /// Case-sensitive lookup, matching how requests are matched against
    /// the URL registry and how a client would look up a header it set
    /// itself.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    /// Case-insensitive lookup, used for the handful of headers (`Host`,
    /// `Connection`, `Upgrade`, `Sec-WebSocket-*`) whose names are fixed
    /// by the protocol and whose casing a client can't be relied on to
    /// match exactly.
    pub fn get_ci(&self, name: &str) -> Option<&str> {
        self.0.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_ci(&self, name: &str) -> bool {
        self.get_ci(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn ci_token_eq(val: &str, token: &str) -> bool {
    val.trim().eq_ignore_ascii_case(token)
}

/// True if the `Connection` header value names `close` among its
/// comma-separated tokens.
pub fn connection_has(val: &str, token: &str) -> bool {
    val.split(',').any(|tok| ci_token_eq(tok, token))
}
