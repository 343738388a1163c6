//! Transport Tests
//!
//! These tests verify:
//! - Header verification and banner skipping on connect
//! - Connect failures (refused, dropped, timed out)
//! - The gated (ssh style) stream behaves exactly like direct TCP
//! - Close unblocks a pending read

#[path = "../common/mod.rs"]
mod common;

use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use common::{MockOptions, MockServer};
use ts3query::config::SshConfig;
use ts3query::protocol::Command;
use ts3query::transport::{self, ssh, tcp, Deadline, StreamKind, Transport};
use ts3query::{Client, Config, QueryError};

// =============================================================================
// Handshake
// =============================================================================

#[test]
fn test_connect_reads_header_and_banner() {
    let server = MockServer::start();
    let client = common::connect(&server);

    assert_eq!(client.kind(), StreamKind::Tcp);
    // The banner must not leak into the first response
    let records = client.exec(&Command::new("version")).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("platform").as_deref(), Some("FreeBSD"));
}

#[test]
fn test_bad_header_fails_connect() {
    let server = MockServer::with_options(MockOptions {
        bad_header: true,
        ..Default::default()
    });

    match Client::connect(&server.addr(), common::test_config()) {
        Err(QueryError::Handshake { expected, received }) => {
            assert_eq!(expected, "TS3");
            assert_eq!(received, "bad");
        }
        Err(other) => panic!("expected handshake error, got {:?}", other),
        Ok(_) => panic!("connect should fail"),
    }
}

#[test]
fn test_no_header_with_verification_disabled() {
    let server = MockServer::with_options(MockOptions {
        no_header: true,
        ..Default::default()
    });
    let config = Config::builder()
        .connect_timeout_ms(2_000)
        .command_timeout_ms(2_000)
        .verify_header(false)
        .skip_banner(false)
        .build();

    let client = Client::connect(&server.addr(), config).unwrap();
    let version = client.version().unwrap();
    assert_eq!(version.version, "3.0.12.2");
}

#[test]
fn test_header_without_banner() {
    let server = MockServer::with_options(MockOptions {
        no_banner: true,
        ..Default::default()
    });
    let config = Config::builder()
        .command_timeout_ms(2_000)
        .skip_banner(false)
        .build();

    let client = Client::connect(&server.addr(), config).unwrap();
    assert_eq!(client.version().unwrap().build, 1455547898);
}

#[test]
fn test_custom_header() {
    let server = MockServer::with_options(MockOptions {
        bad_header: true,
        ..Default::default()
    });
    let config = Config::builder()
        .command_timeout_ms(2_000)
        .header("bad")
        .build();

    assert!(Client::connect(&server.addr(), config).is_ok());
}

// =============================================================================
// Connect Failures
// =============================================================================

#[test]
fn test_connection_refused_is_io_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    match Client::connect(&addr.to_string(), common::test_config()) {
        Err(QueryError::Io(_)) => {}
        Err(other) => panic!("expected io error, got {:?}", other),
        Ok(_) => panic!("connect should fail"),
    }
}

#[test]
fn test_dropped_connection_fails_connect() {
    let server = MockServer::with_options(MockOptions {
        fail_conn: true,
        ..Default::default()
    });

    match Client::connect(&server.addr(), common::test_config()) {
        Err(QueryError::Closed) | Err(QueryError::Io(_)) => {}
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("connect should fail"),
    }
}

#[test]
fn test_silent_server_times_out_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let holder = thread::spawn(move || {
        let (conn, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_millis(500));
        drop(conn);
    });

    let config = Config::builder().connect_timeout_ms(100).build();
    let started = Instant::now();
    match Client::connect(&addr.to_string(), config) {
        Err(QueryError::Timeout(budget)) => assert_eq!(budget, Duration::from_millis(100)),
        Err(other) => panic!("expected timeout, got {:?}", other),
        Ok(_) => panic!("connect should fail"),
    }
    assert!(started.elapsed() < Duration::from_millis(450));
    holder.join().unwrap();
}

// =============================================================================
// Gated (ssh style) Streams
// =============================================================================

#[test]
fn test_gated_stream_matches_direct() {
    let server = MockServer::start();
    let direct = common::connect(&server);
    let gated = common::connect_gated(&server);
    assert_eq!(gated.kind(), StreamKind::Ssh);

    let commands = [
        Command::new("version"),
        Command::new("serverlist"),
        Command::new("clientlist").flag("-uid").flag("-away"),
        Command::new("channellist"),
        Command::new("nosuchcommand"),
    ];

    for command in &commands {
        let a = direct.exec(command).map_err(|e| e.query_id());
        let b = gated.exec(command).map_err(|e| e.query_id());
        assert_eq!(a, b, "results differ for {}", command);
    }
}

#[test]
fn test_gated_negotiation_failure_is_ssh_error() {
    let stream = ssh::gated("gated://nowhere", || {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "authentication failed"))
    })
    .unwrap();

    match Client::from_stream(stream, common::test_config()) {
        Err(QueryError::Ssh(reason)) => assert!(reason.contains("authentication failed")),
        Err(other) => panic!("expected ssh error, got {:?}", other),
        Ok(_) => panic!("connect should fail"),
    }
}

#[test]
fn test_gated_channel_closed_during_handshake_is_ssh_error() {
    let server = MockServer::with_options(MockOptions {
        fail_conn: true,
        ..Default::default()
    });
    let stream = common::gated_stream(server.addr(), Duration::from_millis(10));

    match Client::from_stream(stream, common::test_config()) {
        Err(QueryError::Ssh(_)) | Err(QueryError::Io(_)) => {}
        Err(other) => panic!("expected ssh error, got {:?}", other),
        Ok(_) => panic!("connect should fail"),
    }
}

#[test]
fn test_missing_ssh_program_is_ssh_error() {
    let config = Config::builder()
        .connect_timeout_ms(2_000)
        .ssh(SshConfig {
            program: "/nonexistent/ts3query-test-ssh".into(),
            ..SshConfig::default()
        })
        .build();

    match Client::connect("127.0.0.1", config) {
        Err(QueryError::Ssh(_)) => {}
        Err(other) => panic!("expected ssh error, got {:?}", other),
        Ok(_) => panic!("connect should fail"),
    }
}

// =============================================================================
// Line Transport
// =============================================================================

fn open_transport(server: &MockServer) -> Transport {
    let config = common::test_config();
    let socket = TcpStream::connect(server.addr()).unwrap();
    let stream = tcp::from_socket(socket, &config).unwrap();
    Transport::open(stream, &config).unwrap()
}

#[test]
fn test_read_line_deadline() {
    let server = MockServer::start();
    let mut transport = open_transport(&server);

    let started = Instant::now();
    let result = transport.read_line(Some(Deadline::after(Duration::from_millis(50))));
    assert!(matches!(result, Err(QueryError::Timeout(_))));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_write_then_read_lines() {
    let server = MockServer::start();
    let mut transport = open_transport(&server);
    let deadline = Some(Deadline::after(Duration::from_secs(2)));

    transport.write_line(b"use sid=1\n").unwrap();
    assert_eq!(
        transport.read_line(deadline).unwrap().as_deref(),
        Some("error id=0 msg=ok")
    );
}

#[test]
fn test_close_unblocks_pending_read() {
    let server = MockServer::start();
    let mut transport = open_transport(&server);
    let closer = transport.closer();

    let (done_tx, done_rx) = mpsc::channel();
    let reader = thread::spawn(move || {
        done_tx.send(transport.read_line(None)).unwrap();
    });

    thread::sleep(Duration::from_millis(50));
    closer.close().unwrap();

    let result = done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(matches!(result, Err(QueryError::Closed)));
    reader.join().unwrap();
}

#[test]
fn test_close_is_idempotent() {
    let server = MockServer::start();
    let mut transport = open_transport(&server);

    transport.close().unwrap();
    transport.close().unwrap();
    assert!(transport.is_closed());
    assert!(matches!(transport.write_line(b"version\n"), Err(QueryError::Closed)));
}

#[test]
fn test_connect_applies_default_port() {
    assert_eq!(
        transport::with_default_port("localhost", 10011),
        "localhost:10011"
    );
}
