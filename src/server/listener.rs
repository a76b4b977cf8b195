//! The accept loop and the embeddable [`ListenServer`] handle (§4.8
//! "Request Handling", §4.9 "WebSocket Upgrade", §4.10 "Accept Loop").

use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::enums::Status;
use crate::error::Error;
use crate::net_util::{would_block, write_all_nonblocking};
use crate::request::Request;
use crate::server::config::Config;
use crate::server::connection::{Connection, TickOutcome};
use crate::server::registry::{OnClientJoined, OnReceive, Registry};
use crate::websocket as ws;
use crate::websocket::keys::Accept;
use crate::websocket::queue;

/// What happened to a connection during one pass of the accept loop.
enum Outcome {
    Keep,
    Close,
    Upgrade { url: String, client_id: u64 },
}

fn send_status(registry: &Registry, stream: &mut TcpStream, status: Status) {
    let mut response = registry.status_response(status);
    let _ = write_all_nonblocking(stream, response.bytes());
}

/// §4.8: GET-only, unknown URL -> 404, upgrade requests peeled off to
/// [`dispatch_upgrade`], otherwise the registered static response is
/// served with `Connection` set per the request's own keep-alive wish.
fn dispatch(registry: &Registry, stream: &mut TcpStream, req: &Request) -> Outcome {
    if !req.method().is_get() {
        send_status(registry, stream, Status::NotImplemented501);
        return Outcome::Close;
    }
    if req.wants_websocket_upgrade() && registry.is_websocket_url(req.url()) {
        return dispatch_upgrade(registry, stream, req);
    }
    match registry.lookup_static(req.url()) {
        None => {
            send_status(registry, stream, Status::NotFound404);
            Outcome::Close
        }
        Some(response) => {
            let mut response = response.clone();
            let keep_alive = req.wants_keep_alive();
            response.add_headers(vec![(
                "Connection",
                if keep_alive { "keep-alive" } else { "close" },
            )]);
            let _ = write_all_nonblocking(stream, response.bytes());
            if keep_alive { Outcome::Keep } else { Outcome::Close }
        }
    }
}

/// §4.9: a missing `Sec-WebSocket-Key` is a 400, not a panic (§9
/// resolution). Otherwise derive `Sec-WebSocket-Accept`, send the 101,
/// and hand the caller the client id so it can spawn the driver thread
/// once it has taken ownership of the socket.
fn dispatch_upgrade(registry: &Registry, stream: &mut TcpStream, req: &Request) -> Outcome {
    let key = match req.header("Sec-WebSocket-Key") {
        Some(key) => key.to_string(),
        None => {
            send_status(registry, stream, Status::BadRequest400);
            return Outcome::Close;
        }
    };
    let accept = Accept::from_key(&key);
    let mut response = registry.websocket_success_base();
    response.add_headers(vec![("Sec-WebSocket-Accept", accept.to_string())]);
    let _ = write_all_nonblocking(stream, response.bytes());
    Outcome::Upgrade {
        url: req.url().to_string(),
        client_id: registry.next_client_id(),
    }
}

fn spawn_websocket_driver(
    stream: TcpStream,
    url: String,
    client_id: u64,
    registry: Arc<Registry>,
    ws_config: Arc<ws::Config>,
    shutdown: Arc<AtomicBool>,
    threads: &Mutex<Vec<JoinHandle<()>>>,
) {
    let (sender, receiver) = queue::channel();
    let endpoint = match registry.websocket_endpoint(&url) {
        Some(endpoint) => endpoint,
        None => {
            log::warn!("websocket url {:?} vanished between dispatch and upgrade", url);
            let _ = stream.shutdown(Shutdown::Both);
            return;
        }
    };
    endpoint.register_client(client_id, sender);
    (endpoint.on_client_joined)(&url, client_id);
    log::debug!("websocket client {} joined {:?}", client_id, url);

    let registry_for_receive = Arc::clone(&registry);
    let url_for_receive = url.clone();
    let on_receive: Arc<ws::ReceiveCallback> = Arc::new(move |payload: &[u8], opcode| {
        if let Some(endpoint) = registry_for_receive.websocket_endpoint(&url_for_receive) {
            (endpoint.on_receive)(payload, opcode);
        }
    });

    let registry_for_cleanup = registry;
    let handle = thread::spawn(move || {
        ws::run(stream, ws_config, receiver, on_receive, shutdown);
        if let Some(endpoint) = registry_for_cleanup.websocket_endpoint(&url) {
            endpoint.remove_client(client_id);
        }
        log::debug!("websocket client {} disconnected", client_id);
    });
    threads.lock().unwrap().push(handle);
}

/// §4.10 "Accept Loop", run on the background thread started by
/// [`ListenServer::start_async`].
fn accept_loop(
    listener: TcpListener,
    registry: Arc<Registry>,
    http_config: Arc<Config>,
    ws_config: Arc<ws::Config>,
    run_flag: Arc<AtomicBool>,
    ws_shutdown: Arc<AtomicBool>,
    ws_threads: Arc<Mutex<Vec<JoinHandle<()>>>>,
) {
    let mut connections: Vec<Connection> = Vec::new();
    let mut last_heartbeat = Instant::now();

    while run_flag.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, addr)) => match Connection::new(stream, &http_config) {
                Ok(conn) => {
                    log::debug!("accepted connection from {}", addr);
                    connections.push(conn);
                }
                Err(e) => log::warn!("failed to prepare accepted socket: {}", e),
            },
            Err(ref e) if would_block(e) => {}
            Err(e) => log::warn!("accept failed: {}", e),
        }

        let now = Instant::now();
        let mut to_remove: Vec<(usize, Outcome)> = Vec::new();
        for i in 0..connections.len() {
            let conn = &mut connections[i];
            // `Idle` means no complete request was observed this tick;
            // leave any partially-buffered bytes alone. Only a
            // completed tick (timeout/error/dispatched request) ever
            // changes a connection's fate.
            let outcome = match conn.tick(&http_config, now) {
                TickOutcome::Idle => None,
                TickOutcome::TimedOut => {
                    send_status(&registry, &mut conn.stream, Status::RequestTimeout408);
                    Some(Outcome::Close)
                }
                TickOutcome::PeerClosed => Some(Outcome::Close),
                TickOutcome::IoError(e) => {
                    log::warn!("connection read failed: {}", e);
                    send_status(&registry, &mut conn.stream, Status::InternalServerError500);
                    Some(Outcome::Close)
                }
                TickOutcome::Request(req) => Some(dispatch(&registry, &mut conn.stream, &req)),
            };
            match outcome {
                Some(Outcome::Keep) => conn.reset_for_next_request(now),
                Some(outcome) => to_remove.push((i, outcome)),
                None => {}
            }
        }

        to_remove.sort_by(|a, b| b.0.cmp(&a.0));
        for (i, outcome) in to_remove {
            let conn = connections.swap_remove(i);
            match outcome {
                Outcome::Close => {
                    let _ = conn.stream.shutdown(Shutdown::Both);
                }
                Outcome::Upgrade { url, client_id } => spawn_websocket_driver(
                    conn.stream,
                    url,
                    client_id,
                    Arc::clone(&registry),
                    Arc::clone(&ws_config),
                    Arc::clone(&ws_shutdown),
                    &ws_threads,
                ),
                Outcome::Keep => unreachable!("kept connections never enter to_remove"),
            }
        }

        if now.saturating_duration_since(last_heartbeat) > http_config.accept_loop_heartbeat {
            last_heartbeat = now;
            log::trace!("accept loop alive, {} open connections", connections.len());
        }

        thread::sleep(http_config.idle_sleep);
    }

    for conn in connections {
        let _ = conn.stream.shutdown(Shutdown::Both);
    }
}

/// The embeddable server handle (§6 "Embedding API").
///
/// Registration (`register_static`/`register_websocket`) must happen
/// before [`ListenServer::start_async`] (§5 "Shared state" resolution):
/// the registry becomes read-only, wrapped in an `Arc`, the moment the
/// accept thread is spawned.
pub struct ListenServer {
    http_config: Arc<Config>,
    ws_config: Arc<ws::Config>,
    registry: Option<Registry>,
    listener: Option<TcpListener>,
    bound_port: Option<u16>,
    running: Option<RunningState>,
}

struct RunningState {
    registry: Arc<Registry>,
    run_flag: Arc<AtomicBool>,
    ws_shutdown: Arc<AtomicBool>,
    accept_thread: JoinHandle<()>,
    ws_threads: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl ListenServer {
    pub fn new(http_config: Arc<Config>, ws_config: Arc<ws::Config>) -> ListenServer {
        ListenServer {
            http_config,
            ws_config,
            registry: Some(Registry::new()),
            listener: None,
            bound_port: None,
            running: None,
        }
    }

    /// Bind and listen (§6 `init`). Port `0` asks the OS to pick a free
    /// port; the port actually bound is available from
    /// [`ListenServer::port`] afterwards.
    pub fn init(&mut self, port: u16) -> Result<(), Error> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        listener.set_nonblocking(true)?;
        self.bound_port = Some(listener.local_addr()?.port());
        self.listener = Some(listener);
        Ok(())
    }

    /// The port bound by [`ListenServer::init`], if any.
    pub fn port(&self) -> Option<u16> {
        self.bound_port
    }

    /// Register a GET-servable artifact (§6 `register_static`). Must be
    /// called before [`ListenServer::start_async`].
    pub fn register_static<I, N, V>(
        &mut self,
        url: impl Into<String>,
        bytes: Vec<u8>,
        content_type: &str,
        extra_headers: I,
    ) -> Result<(), Error>
        where I: IntoIterator<Item = (N, V)>,
              N: Into<String>,
              V: Into<String>,
    {
        let registry = self.registry.as_mut().ok_or(Error::AlreadyStarted)?;
        registry.register_static(url, bytes, content_type, extra_headers);
        Ok(())
    }

    /// Register a WebSocket endpoint (§6 `register_websocket`). Must be
    /// called before [`ListenServer::start_async`].
    pub fn register_websocket(
        &mut self,
        url: impl Into<String>,
        on_receive: OnReceive,
        on_client_joined: OnClientJoined,
    ) -> Result<(), Error> {
        let registry = self.registry.as_mut().ok_or(Error::AlreadyStarted)?;
        registry.register_websocket(url, on_receive, on_client_joined);
        Ok(())
    }

    /// Begin the accept loop on a background thread (§6 `start_async`).
    pub fn start_async(&mut self) -> Result<(), Error> {
        if self.running.is_some() {
            return Err(Error::AlreadyStarted);
        }
        let listener = self.listener.take().ok_or(Error::AlreadyStarted)?;
        let registry = Arc::new(self.registry.take().ok_or(Error::AlreadyStarted)?);
        let run_flag = Arc::new(AtomicBool::new(true));
        let ws_shutdown = Arc::new(AtomicBool::new(false));
        let ws_threads = Arc::new(Mutex::new(Vec::new()));

        let accept_thread = {
            let registry = Arc::clone(&registry);
            let http_config = Arc::clone(&self.http_config);
            let ws_config = Arc::clone(&self.ws_config);
            let run_flag = Arc::clone(&run_flag);
            let ws_shutdown = Arc::clone(&ws_shutdown);
            let ws_threads = Arc::clone(&ws_threads);
            thread::spawn(move || {
                accept_loop(listener, registry, http_config, ws_config, run_flag, ws_shutdown, ws_threads);
            })
        };

        self.running = Some(RunningState {
            registry,
            run_flag,
            ws_shutdown,
            accept_thread,
            ws_threads,
        });
        Ok(())
    }

    /// Enqueue an outbound frame for one connected WebSocket client (§6
    /// `send_websocket`).
    pub fn send_websocket(
        &self,
        url: &str,
        client_id: u64,
        payload: Vec<u8>,
        opcode: ws::Opcode,
    ) -> Result<(), Error> {
        let running = self.running.as_ref().ok_or(Error::AlreadyStarted)?;
        let endpoint = running.registry.websocket_endpoint(url)
            .ok_or_else(|| Error::UnknownWebsocketUrl(url.to_string()))?;
        let sender = endpoint.sender(client_id)
            .ok_or_else(|| Error::UnknownClient(url.to_string(), client_id))?;
        sender.send(opcode, payload)
            .map_err(|_| Error::UnknownClient(url.to_string(), client_id))
    }

    /// Signal shutdown and join every thread: the accept thread, then
    /// every active WebSocket driver thread (§5 "Cancellation and
    /// timeouts", §9 resolution).
    pub fn stop(&mut self) -> Result<(), Error> {
        let running = match self.running.take() {
            Some(running) => running,
            None => return Ok(()),
        };
        running.run_flag.store(false, Ordering::SeqCst);
        let _ = running.accept_thread.join();

        running.ws_shutdown.store(true, Ordering::SeqCst);
        let mut threads = running.ws_threads.lock().unwrap();
        for handle in threads.drain(..) {
            let _ = handle.join();
        }
        Ok(())
    }
}

impl Drop for ListenServer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
