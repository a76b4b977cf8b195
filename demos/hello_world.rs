//! Minimal static-GET demo: registers one URL and serves it until
//! Ctrl-C. Run with `RUST_LOG=info cargo run --example hello_world`.

use std::env;
use std::thread;
use std::time::Duration;

const BODY: &str = "Hello World!";

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let mut server = embedserve::new();
    server.init(8080).expect("bind 0.0.0.0:8080");
    server.register_static("/", BODY.as_bytes().to_vec(), "text/plain", Vec::<(String, String)>::new())
        .expect("register /");
    server.start_async().expect("start accept loop");

    log::info!("listening on 0.0.0.0:8080");
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
