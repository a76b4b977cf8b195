//! End-to-end scenarios against a live `ListenServer` on loopback,
//! covering §8's S1-S8 plus the keep-alive invariant.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use embedserve::websocket::Opcode;

fn read_response(stream: &mut TcpStream) -> String {
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let mut buf = Vec::new();
    let mut scratch = [0u8; 4096];
    loop {
        match stream.read(&mut scratch) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&scratch[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn read_exact_with_timeout(stream: &mut TcpStream, n: usize) -> Vec<u8> {
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
    let mut buf = vec![0u8; n];
    stream.read_exact(&mut buf).unwrap();
    buf
}

fn start_server() -> (embedserve::ListenServer, u16) {
    let mut server = embedserve::new();
    server.init(0).expect("bind ephemeral port");
    let port = server.port().expect("port recorded after init");
    (server, port)
}

fn do_handshake(stream: &mut TcpStream) -> String {
    stream.write_all(
        b"GET /ws HTTP/1.1\r\n\
          Connection: Upgrade\r\n\
          Upgrade: websocket\r\n\
          Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
          \r\n",
    ).unwrap();
    read_response(stream)
}

#[test]
fn s1_unregistered_url_is_404() {
    let (mut server, port) = start_server();
    server.start_async().unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.write_all(b"GET /missing HTTP/1.1\r\n\r\n").unwrap();
    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));

    server.stop().unwrap();
}

#[test]
fn s2_non_get_method_is_501() {
    let (mut server, port) = start_server();
    server.start_async().unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.write_all(b"POST /anything HTTP/1.1\r\n\r\n").unwrap();
    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 501 Not Implemented\r\n"));

    server.stop().unwrap();
}

#[test]
fn s3_registered_static_is_served() {
    let (mut server, port) = start_server();
    server.register_static("/x", b"hi".to_vec(), "text/plain", Vec::<(String, String)>::new()).unwrap();
    server.start_async().unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.write_all(b"GET /x HTTP/1.1\r\nConnection: close\r\n\r\n").unwrap();
    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 200 Ok\r\n"));
    assert!(response.contains("Content-Length: 2\r\n"));
    assert!(response.ends_with("\r\n\r\nhi"));

    server.stop().unwrap();
}

#[test]
fn s4_websocket_handshake_and_client_joined_callback() {
    let (mut server, port) = start_server();
    let joined: Arc<Mutex<Option<(String, u64)>>> = Arc::new(Mutex::new(None));
    let joined_cl = Arc::clone(&joined);
    server.register_websocket(
        "/ws",
        Box::new(|_payload: &[u8], _opcode: Opcode| {}),
        Box::new(move |url: &str, id: u64| {
            *joined_cl.lock().unwrap() = Some((url.to_string(), id));
        }),
    ).unwrap();
    server.start_async().unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    let response = do_handshake(&mut stream);
    assert!(response.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
    assert!(response.contains("Sec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n"));
    assert!(response.contains("Connection: Upgrade\r\n"));
    assert!(response.contains("Upgrade: websocket\r\n"));

    std::thread::sleep(Duration::from_millis(50));
    let (url, _id) = joined.lock().unwrap().clone().expect("on-client-joined fired");
    assert_eq!(url, "/ws");

    server.stop().unwrap();
}

#[test]
fn s5_websocket_echo() {
    let (mut server, port) = start_server();
    let joined: Arc<Mutex<Option<u64>>> = Arc::new(Mutex::new(None));
    let joined_cl = Arc::clone(&joined);
    let server = Arc::new(Mutex::new(server));
    let server_for_receive = Arc::clone(&server);

    server.lock().unwrap().register_websocket(
        "/ws",
        Box::new(move |payload: &[u8], opcode: Opcode| {
            if let Some(id) = *joined_cl.lock().unwrap() {
                server_for_receive.lock().unwrap()
                    .send_websocket("/ws", id, payload.to_vec(), opcode)
                    .expect("echo send");
            }
        }),
        Box::new({
            let joined = Arc::clone(&joined);
            move |_url: &str, id: u64| {
                *joined.lock().unwrap() = Some(id);
            }
        }),
    ).unwrap();
    server.lock().unwrap().start_async().unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    do_handshake(&mut stream);

    // unmasked text frame "ping" (server never requires client masking
    // for the purpose of this test's assertions, mirroring §4.4: the
    // decoder unmasks when the mask bit is set and passes bytes through
    // otherwise).
    stream.write_all(&[0x81, 0x04, b'p', b'i', b'n', b'g']).unwrap();

    let header = read_exact_with_timeout(&mut stream, 2);
    assert_eq!(header[0], 0x81); // fin=1, opcode=text
    let len = (header[1] & 0x7F) as usize;
    let body = read_exact_with_timeout(&mut stream, len);
    assert_eq!(&body, b"pong");

    server.lock().unwrap().stop().unwrap();
}

#[test]
fn s6_websocket_fragmentation_reassembles_once() {
    let (mut server, port) = start_server();
    let received: Arc<Mutex<Vec<(Vec<u8>, Opcode)>>> = Arc::new(Mutex::new(Vec::new()));
    let received_cl = Arc::clone(&received);
    server.register_websocket(
        "/ws",
        Box::new(move |payload: &[u8], opcode: Opcode| {
            received_cl.lock().unwrap().push((payload.to_vec(), opcode));
        }),
        Box::new(|_url: &str, _id: u64| {}),
    ).unwrap();
    server.start_async().unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    do_handshake(&mut stream);

    // (fin=0, text, "he"), (fin=0, continuation, "ll"), (fin=1, continuation, "o")
    stream.write_all(&[0x01, 0x02, b'h', b'e']).unwrap();
    stream.write_all(&[0x00, 0x02, b'l', b'l']).unwrap();
    stream.write_all(&[0x80, 0x01, b'o']).unwrap();

    std::thread::sleep(Duration::from_millis(150));

    let messages = received.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, b"hello");
    assert_eq!(messages[0].1, Opcode::Text);

    server.stop().unwrap();
}

#[test]
fn s7_missing_websocket_key_is_400() {
    let (mut server, port) = start_server();
    server.register_websocket(
        "/ws",
        Box::new(|_payload: &[u8], _opcode: Opcode| {}),
        Box::new(|_url: &str, _id: u64| {}),
    ).unwrap();
    server.start_async().unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.write_all(
        b"GET /ws HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\r\n",
    ).unwrap();
    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    server.stop().unwrap();
}

#[test]
fn s8_shutdown_joins_websocket_driver_and_closes_port() {
    let (mut server, port) = start_server();
    server.register_websocket(
        "/ws",
        Box::new(|_payload: &[u8], _opcode: Opcode| {}),
        Box::new(|_url: &str, _id: u64| {}),
    ).unwrap();
    server.start_async().unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    let _ = do_handshake(&mut stream);

    server.stop().unwrap();

    assert!(TcpStream::connect(("127.0.0.1", port)).is_err());
}

#[test]
fn keep_alive_serves_two_requests_on_one_socket() {
    let (mut server, port) = start_server();
    server.register_static("/x", b"hi".to_vec(), "text/plain", Vec::<(String, String)>::new()).unwrap();
    server.start_async().unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.write_all(b"GET /x HTTP/1.1\r\nConnection: keep-alive\r\n\r\n").unwrap();
    let first = read_response(&mut stream);
    assert!(first.contains("Connection: keep-alive\r\n"));

    stream.write_all(b"GET /x HTTP/1.1\r\nConnection: close\r\n\r\n").unwrap();
    let second = read_response(&mut stream);
    assert!(second.starts_with("HTTP/1.1 200 Ok\r\n"));
    assert!(second.contains("Connection: close\r\n"));

    server.stop().unwrap();
}
