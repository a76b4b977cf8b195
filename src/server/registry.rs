//! The URL registry (§3 "URL Registry", §3 "WebSocket Endpoint
//! Descriptor"): a `url -> Response` map plus the prebuilt status
//! catalog, and a `url -> WebsocketEndpoint` map for upgraded URLs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::enums::Status;
use crate::response::Response;
use crate::server::html::{DefaultStatusPage, StatusPage};
use crate::websocket::codec::Opcode;
use crate::websocket::queue::SendHandle;

/// Registry key for the prebuilt 101 handshake template (§3).
pub const WEBSOCKET_SUCCESS_BASE: &str = "websocket-success-base";

/// Invoked once per completed inbound logical WebSocket message.
pub type OnReceive = Box<dyn Fn(&[u8], Opcode) + Send + Sync>;
/// Invoked once a client's 101 response has been sent (§6
/// `on-client-joined`).
pub type OnClientJoined = Box<dyn Fn(&str, u64) + Send + Sync>;

/// Per-WebSocket-URL state (§3 "WebSocket Endpoint Descriptor").
pub struct WebsocketEndpoint {
    pub on_client_joined: OnClientJoined,
    pub on_receive: OnReceive,
    senders: Mutex<HashMap<u64, SendHandle>>,
}

impl WebsocketEndpoint {
    fn new(on_receive: OnReceive, on_client_joined: OnClientJoined) -> WebsocketEndpoint {
        WebsocketEndpoint {
            on_client_joined,
            on_receive,
            senders: Mutex::new(HashMap::new()),
        }
    }

    pub fn register_client(&self, id: u64, handle: SendHandle) {
        self.senders.lock().unwrap().insert(id, handle);
    }

    pub fn remove_client(&self, id: u64) {
        self.senders.lock().unwrap().remove(&id);
    }

    pub fn sender(&self, id: u64) -> Option<SendHandle> {
        self.senders.lock().unwrap().get(&id).cloned()
    }
}

/// Owns every URL this server can answer, plus WebSocket endpoint
/// metadata for upgraded URLs.
pub struct Registry {
    statics: HashMap<String, Response>,
    websockets: HashMap<String, WebsocketEndpoint>,
    next_client_id: AtomicU64,
    page: Box<dyn StatusPage>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::with_status_page(Box::new(DefaultStatusPage))
    }

    pub fn with_status_page(page: Box<dyn StatusPage>) -> Registry {
        let mut registry = Registry {
            statics: HashMap::new(),
            websockets: HashMap::new(),
            next_client_id: AtomicU64::new(1),
            page,
        };
        registry.populate_status_catalog();
        registry
    }

    /// Build the canned per-status responses and the 101 handshake
    /// template (§4.3 "Prebuilt response catalog").
    fn populate_status_catalog(&mut self) {
        for &status in Status::ALL {
            let mut response = Response::new(status);
            response.add_headers(vec![("Connection", "Close")]);
            let page = self.page.render(&status.registry_key());
            response.add_content(page, "text/html; charset=utf-8");
            self.statics.insert(status.registry_key(), response);
        }

        let mut ws_base = Response::new(Status::SwitchingProtocols101);
        ws_base.add_headers(vec![
            ("Connection", "Upgrade"),
            ("Upgrade", "websocket"),
        ]);
        self.statics.insert(WEBSOCKET_SUCCESS_BASE.to_string(), ws_base);
    }

    /// Register a GET-servable static artifact (§6 `register_static`).
    pub fn register_static<I, N, V>(
        &mut self,
        url: impl Into<String>,
        bytes: Vec<u8>,
        content_type: &str,
        extra_headers: I,
    )
        where I: IntoIterator<Item = (N, V)>,
              N: Into<String>,
              V: Into<String>,
    {
        let mut response = Response::new(Status::Ok200);
        response.add_content(bytes, content_type);
        response.add_headers(extra_headers);
        self.statics.insert(url.into(), response);
    }

    /// Register a WebSocket endpoint (§6 `register_websocket`).
    pub fn register_websocket(
        &mut self,
        url: impl Into<String>,
        on_receive: OnReceive,
        on_client_joined: OnClientJoined,
    ) {
        self.websockets.insert(url.into(), WebsocketEndpoint::new(on_receive, on_client_joined));
    }

    pub fn lookup_static(&self, url: &str) -> Option<&Response> {
        self.statics.get(url)
    }

    pub fn status_response(&self, status: Status) -> Response {
        self.statics.get(&status.registry_key())
            .cloned_response()
    }

    pub fn websocket_success_base(&self) -> Response {
        self.statics.get(WEBSOCKET_SUCCESS_BASE)
            .cloned_response()
    }

    pub fn websocket_endpoint(&self, url: &str) -> Option<&WebsocketEndpoint> {
        self.websockets.get(url)
    }

    pub fn is_websocket_url(&self, url: &str) -> bool {
        self.websockets.contains_key(url)
    }

    /// Issue a fresh, process-wide-unique client id (§9 resolution:
    /// monotonic counter, not an OS socket handle).
    pub fn next_client_id(&self) -> u64 {
        self.next_client_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new()
    }
}

trait ExpectPrebuilt {
    fn cloned_response(self) -> Response;
}

impl ExpectPrebuilt for Option<&Response> {
    fn cloned_response(self) -> Response {
        self.cloned().expect("prebuilt status catalog entry is always present")
    }
}
