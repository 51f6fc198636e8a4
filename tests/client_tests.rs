//! Client Integration Tests
//!
//! Each test spins up a scripted TCP stand-in for the filter service on
//! an ephemeral port, then drives the public client surface against it.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bloomlink::{BloomClient, BloomError, Config};
use bytes::Bytes;

// =============================================================================
// Scripted Service Stand-In
// =============================================================================

/// One scripted exchange: the request line the service expects, and the
/// raw reply it sends back. `None` drops the connection mid-request.
struct Exchange {
    expect: &'static str,
    reply: Option<&'static [u8]>,
}

fn exchange(expect: &'static str, reply: &'static [u8]) -> Exchange {
    Exchange {
        expect,
        reply: Some(reply),
    }
}

fn drop_after(expect: &'static str) -> Exchange {
    Exchange {
        expect,
        reply: None,
    }
}

/// Spawn a single-connection scripted service
fn spawn_service(script: Vec<Exchange>) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stand-in service");
    let addr = listener.local_addr().expect("local addr");

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut writer = stream;

        for step in script {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read request line");
            assert_eq!(line, step.expect);

            match step.reply {
                Some(reply) => {
                    writer.write_all(reply).expect("write reply");
                    writer.flush().expect("flush reply");
                }
                None => return,
            }
        }
    });

    (addr, handle)
}

fn connected_client(addr: SocketAddr) -> BloomClient {
    let config = Config::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .build();
    let client = BloomClient::with_config(config);
    client.connect().expect("connect");
    client
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_add_has_count_round_trip() {
    let (addr, service) = spawn_service(vec![
        exchange("ADD a\n", b"OK.\n"),
        exchange("HAS a\n", b"Yes.\n"),
        exchange("CNT a\n", b"1.\n"),
    ]);

    let client = connected_client(addr);
    assert!(client.is_open());

    client.add(["a"]).expect("add");
    assert!(client.has("a").expect("has"));
    assert_eq!(client.count("a").expect("count"), 1);

    client.end();
    service.join().expect("service");
}

#[test]
fn test_absent_item_reports_no() {
    let (addr, service) = spawn_service(vec![exchange("HAS ghost\n", b"No.\n")]);

    let client = connected_client(addr);
    assert!(!client.has("ghost").expect("has"));

    client.end();
    service.join().expect("service");
}

#[test]
fn test_variadic_add_sends_one_command_line() {
    let (addr, service) = spawn_service(vec![exchange("ADD a b c\n", b"OK.\n")]);

    let client = connected_client(addr);
    client.add(["a", "b", "c"]).expect("add");

    client.end();
    service.join().expect("service");
}

#[test]
fn test_remove_round_trip() {
    let (addr, service) = spawn_service(vec![
        exchange("RMV a b\n", b"OK.\n"),
        exchange("HAS a\n", b"No.\n"),
    ]);

    let client = connected_client(addr);
    client.remove(["a", "b"]).expect("remove");
    assert!(!client.has("a").expect("has"));

    client.end();
    service.join().expect("service");
}

#[test]
fn test_binary_returns_raw_state() {
    let (addr, service) = spawn_service(vec![exchange("BIN\n", b"\x00\xDE\xAD\xFF")]);

    let client = connected_client(addr);
    let state = client.binary().expect("binary");
    assert_eq!(state, Bytes::from_static(b"\x00\xDE\xAD\xFF"));

    client.end();
    service.join().expect("service");
}

// =============================================================================
// Error Surfacing
// =============================================================================

#[test]
fn test_unexpected_has_reply_is_protocol_error() {
    let (addr, service) = spawn_service(vec![exchange("HAS a\n", b"Maybe.\n")]);

    let client = connected_client(addr);
    match client.has("a") {
        Err(BloomError::Protocol(raw)) => assert_eq!(raw, "Maybe.\n"),
        other => panic!("expected protocol error, got {:?}", other),
    }

    client.end();
    service.join().expect("service");
}

#[test]
fn test_count_service_error_surfaces_raw_text() {
    let (addr, service) = spawn_service(vec![exchange("CNT nope\n", b"ERROR.unknown item")]);

    let client = connected_client(addr);
    match client.count("nope") {
        Err(BloomError::Service(raw)) => assert_eq!(raw, "ERROR.unknown item"),
        other => panic!("expected service error, got {:?}", other),
    }

    client.end();
    service.join().expect("service");
}

#[test]
fn test_close_while_request_outstanding() {
    let (addr, service) = spawn_service(vec![drop_after("BIN\n")]);

    let client = connected_client(addr);
    match client.binary() {
        Err(BloomError::ConnectionClosed) => {}
        other => panic!("expected connection-closed error, got {:?}", other),
    }

    service.join().expect("service");
}

#[test]
fn test_send_before_connect_fails_fast() {
    let client = BloomClient::new();
    match client.has("a") {
        Err(BloomError::NotConnected) => {}
        other => panic!("expected not-connected error, got {:?}", other),
    }
}

#[test]
fn test_connect_twice_is_rejected() {
    let (addr, service) = spawn_service(vec![exchange("HAS a\n", b"Yes.\n")]);

    let client = connected_client(addr);
    match client.connect() {
        Err(BloomError::Connection(_)) => {}
        other => panic!("expected connection error, got {:?}", other),
    }

    // The first connection is unaffected by the rejected second attempt
    assert!(client.has("a").expect("has"));

    client.end();
    service.join().expect("service");
}

#[test]
fn test_connection_refused_surfaces_as_connection_error() {
    // Grab a port the OS just released so nothing is listening on it
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let config = Config::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .build();
    let client = BloomClient::with_config(config);

    match client.connect() {
        Err(BloomError::Connection(_)) => {}
        other => panic!("expected connection error, got {:?}", other),
    }
}

// =============================================================================
// Timeouts & Orphaned Data
// =============================================================================

#[test]
fn test_response_deadline_expires() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let service = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut line = String::new();
        reader.read_line(&mut line).expect("read request");
        assert_eq!(line, "HAS a\n");
        // Sit on the request well past the client's deadline
        thread::sleep(Duration::from_millis(500));
    });

    let config = Config::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .response_timeout_ms(100)
        .build();
    let client = BloomClient::with_config(config);
    client.connect().expect("connect");

    match client.has("a") {
        Err(BloomError::Timeout) => {}
        other => panic!("expected timeout, got {:?}", other),
    }

    service.join().expect("service");
}

#[test]
fn test_unsolicited_data_is_discarded() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let service = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut writer = stream.try_clone().expect("clone");
        // Push bytes at the client before it has asked anything
        writer.write_all(b"Garbage\n").expect("write unsolicited");
        writer.flush().expect("flush");

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line).expect("read request");
        assert_eq!(line, "HAS a\n");
        writer.write_all(b"Yes.\n").expect("write reply");
        writer.flush().expect("flush");
    });

    let config = Config::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .build();
    let client = BloomClient::with_config(config);
    client.connect().expect("connect");

    // Give the unsolicited bytes time to arrive and be dropped
    thread::sleep(Duration::from_millis(150));

    assert!(client.has("a").expect("has"));

    client.end();
    service.join().expect("service");
}

// =============================================================================
// Send Serialization
// =============================================================================

#[test]
fn test_concurrent_callers_are_serialized() {
    let (addr, service) = spawn_service(vec![
        exchange("CNT a\n", b"1.\n"),
        exchange("CNT a\n", b"2.\n"),
    ]);

    let client = connected_client(addr);

    let mut counts = thread::scope(|scope| {
        let first = scope.spawn(|| client.count("a").expect("count"));
        let second = scope.spawn(|| client.count("a").expect("count"));
        vec![first.join().expect("join"), second.join().expect("join")]
    });

    // Whichever caller went first got 1; both exchanges completed intact
    counts.sort_unstable();
    assert_eq!(counts, vec![1, 2]);

    client.end();
    service.join().expect("service");
}
