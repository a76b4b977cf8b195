//! WebSocket demo: serves a static page at `/` and logs every message
//! received on `/ws`.

use std::env;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use embedserve::websocket::Opcode;

const INDEX: &str = "<!DOCTYPE html><html><body>\
    <p>Connect to ws://localhost:8080/ws and send a message.</p>\
    </body></html>";

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let mut server = embedserve::new();
    server.init(8080).expect("bind 0.0.0.0:8080");
    server.register_static("/", INDEX.as_bytes().to_vec(), "text/html; charset=utf-8", Vec::<(String, String)>::new())
        .expect("register /");

    let connected: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let joined = Arc::clone(&connected);

    server.register_websocket(
        "/ws",
        Box::new(move |payload: &[u8], opcode: Opcode| {
            log::info!("received {} bytes ({:?})", payload.len(), opcode);
        }),
        Box::new(move |url, id| {
            joined.lock().unwrap().push(id);
            log::info!("client {} joined {}", id, url);
        }),
    ).expect("register /ws");

    server.start_async().expect("start accept loop");

    log::info!("listening on 0.0.0.0:8080, websocket at /ws");
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
